use crate::engine::PeerId;

/// What the rendering layer should put on screen for an active call:
/// the local preview tile plus one remote tile per peer, in roster order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoLayout {
    pub channel: String,
    pub remotes: Vec<PeerId>,
}

/// Compose the render layout from current session state.
///
/// Returns `None` until the join has been confirmed; nothing is rendered
/// while the session is idle or a join is still in flight.
pub fn compose_layout(channel: &str, joined: bool, roster: Vec<PeerId>) -> Option<VideoLayout> {
    if !joined {
        return None;
    }
    Some(VideoLayout {
        channel: channel.to_string(),
        remotes: roster,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_rendered_before_join() {
        assert_eq!(compose_layout("DucTien", false, vec![2002]), None);
    }

    #[test]
    fn joined_with_empty_roster_shows_local_only() {
        let layout = compose_layout("DucTien", true, vec![]).unwrap();
        assert_eq!(layout.channel, "DucTien");
        assert!(layout.remotes.is_empty());
    }

    #[test]
    fn remote_tiles_follow_roster_order() {
        let layout = compose_layout("DucTien", true, vec![3003, 4004]).unwrap();
        assert_eq!(layout.remotes, vec![3003, 4004]);
    }
}
