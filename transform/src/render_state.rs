use crate::{
    label_size::LabelSize,
    props::Props,
    source::{
        ParticipantId,
        Source,
    },
};
use serde::{
    Deserialize,
    Serialize,
};

/// Display flags derived from the current props and source. Never stored
/// between renders.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderState {
    pub is_self: bool,
    pub mute_audio: bool,
    pub has_video: bool,
    pub has_seen: bool,
    pub label_size: LabelSize,
}

impl RenderState {
    /// Total over absent inputs: without props or source the video is hidden
    /// and the placeholder shows. The label size starts at its default and is
    /// filled in by the caller, which knows the surface geometry.
    pub fn derive(props: Option<&Props>, source: Option<&Source>, local_participant: Option<&ParticipantId>) -> Self {
        let is_self = match (source, local_participant) {
            (Some(source), Some(local)) => {
                source.id.as_str() == local.as_str() || source.props.participant_id() == Some(local.as_str())
            }
            _ => false,
        };

        // The local participant is muted whatever the host configured.
        let mute_audio = is_self || props.is_some_and(|props| props.is_muted);

        let has_video = match (props, source) {
            (Some(props), Some(source)) => !props.is_hidden && source.props.video_enabled(),
            _ => false,
        };

        Self {
            is_self,
            mute_audio,
            has_video,
            has_seen: props.is_some_and(|props| props.no_display),
            label_size: LabelSize::default(),
        }
    }

    pub fn with_label_size(self, label_size: LabelSize) -> Self {
        Self { label_size, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceProps;
    use pretty_assertions::assert_eq;

    fn ann(video_enabled: bool) -> Source {
        Source::new(
            "s-ann",
            SourceProps::default()
                .with("participantId", "p2")
                .with("displayName", "Ann")
                .with("videoEnabled", video_enabled),
            None,
        )
    }

    fn props(volume: f64, is_muted: bool) -> Props {
        Props {
            volume,
            is_muted,
            ..Props::default()
        }
    }

    #[test]
    fn remote_participant_plays() {
        let state = RenderState::derive(Some(&props(0.8, false)), Some(&ann(true)), Some(&ParticipantId::new("p1")));
        assert_eq!(
            state,
            RenderState {
                is_self: false,
                mute_audio: false,
                has_video: true,
                has_seen: false,
                label_size: LabelSize::Tiny,
            }
        );
    }

    #[test]
    fn local_participant_is_always_muted() {
        let local = ParticipantId::new("p2");
        for is_muted in [false, true] {
            let state = RenderState::derive(Some(&props(1.0, is_muted)), Some(&ann(true)), Some(&local));
            assert!(state.is_self);
            assert!(state.mute_audio);
        }
        let without_props = RenderState::derive(None, Some(&ann(true)), Some(&local));
        assert!(without_props.mute_audio);
    }

    #[test]
    fn self_is_also_detected_by_source_id() {
        let state = RenderState::derive(Some(&props(1.0, false)), Some(&ann(true)), Some(&ParticipantId::new("s-ann")));
        assert!(state.is_self);
    }

    #[test]
    fn explicit_hide_overrides_video() {
        let hidden = Props {
            is_hidden: true,
            ..Props::default()
        };
        let state = RenderState::derive(Some(&hidden), Some(&ann(true)), None);
        assert!(!state.has_video);
    }

    #[test]
    fn source_without_video_shows_placeholder() {
        let state = RenderState::derive(Some(&Props::default()), Some(&ann(false)), None);
        assert!(!state.has_video);
    }

    #[test]
    fn absent_inputs_degrade() {
        let state = RenderState::derive(None, None, Some(&ParticipantId::new("p1")));
        assert_eq!(state, RenderState::default());
        assert!(!RenderState::derive(Some(&Props::default()), None, None).has_video);
        assert!(!RenderState::derive(None, Some(&ann(true)), None).has_video);
    }

    #[test]
    fn no_display_marks_seen() {
        let seen = Props {
            no_display: true,
            ..Props::default()
        };
        assert!(RenderState::derive(Some(&seen), None, None).has_seen);
    }
}
