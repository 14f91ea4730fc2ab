use std::collections::HashMap;

use onair_core::engine::PeerId;

/// Synthetic ids start above the range numeric identities occupy in
/// practice, so the two never collide.
const SYNTHETIC_BASE: PeerId = 1 << 32;

/// Maps engine participant identities to numeric peer ids.
///
/// Identities that are already numeric pass through unchanged; everything
/// else gets a synthetic id. A forgotten peer that rejoins is assigned a
/// fresh id: ids are unique per channel membership, not per account.
#[derive(Debug)]
pub struct PeerDirectory {
    by_identity: HashMap<String, PeerId>,
    next_synthetic: PeerId,
}

impl PeerDirectory {
    pub fn new() -> Self {
        Self {
            by_identity: HashMap::new(),
            next_synthetic: SYNTHETIC_BASE,
        }
    }

    /// The peer id for `identity`, allocating one on first sight.
    pub fn uid_for(&mut self, identity: &str) -> PeerId {
        if let Some(uid) = self.by_identity.get(identity) {
            return *uid;
        }
        let uid = match identity.parse::<PeerId>() {
            Ok(n) if n != 0 && n < SYNTHETIC_BASE => n,
            _ => {
                let uid = self.next_synthetic;
                self.next_synthetic += 1;
                uid
            }
        };
        self.by_identity.insert(identity.to_string(), uid);
        uid
    }

    /// Drop the mapping for a departed peer, returning its id.
    pub fn forget(&mut self, identity: &str) -> Option<PeerId> {
        self.by_identity.remove(identity)
    }
}

impl Default for PeerDirectory {
    fn default() -> Self {
        Self::new()
    }
}
