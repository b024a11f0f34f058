//! Description of what a participant surface should show.
//!
//! [`render`] is the explicit redraw step: it is invoked after every lifecycle
//! transition and its output is handed to [`MediaSurface::present`].
//!
//! [`MediaSurface::present`]: crate::MediaSurface::present

use crate::{
    label_size::LabelSize,
    props::Props,
    render_state::RenderState,
    source::{
        Source,
        SourceKind,
    },
};
use serde::{
    Deserialize,
    Serialize,
};
use strum::Display;

pub const PLACEHOLDER_BACKGROUND: &str = "#222";

#[derive(Debug, Clone, Copy, Display, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ObjectFit {
    Contain,
    Cover,
}

/// Shown behind the video while there is nothing to show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceholderView {
    pub hidden: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    pub opacity: f32,
    /// Upper-cased first letter of the display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoView {
    pub muted: bool,
    pub volume: f64,
    pub opacity: f32,
    pub fit: ObjectFit,
    pub autoplay: bool,
    pub plays_inline: bool,
    pub picture_in_picture: bool,
    /// Label of the stream bound to the element.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameBannerView {
    pub display_name: String,
    pub size: LabelSize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceView {
    pub placeholder: PlaceholderView,
    pub video: VideoView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_banner: Option<NameBannerView>,
}

impl SurfaceView {
    /// Whether the placeholder is what a viewer actually sees.
    pub fn shows_placeholder(&self) -> bool {
        self.video.opacity == 0.0
    }
}

pub fn render(props: Option<&Props>, source: Option<&Source>, state: &RenderState) -> SurfaceView {
    let display_name = source
        .and_then(|source| source.props.display_name())
        .filter(|name| !name.is_empty() && !state.has_seen);

    let fit = match source.and_then(|source| source.props.kind()) {
        Some(SourceKind::Screen) => ObjectFit::Contain,
        _ => ObjectFit::Cover,
    };

    // Streams are only bound while there are props.
    let stream = props
        .and(source)
        .and_then(|source| source.value.as_ref())
        .map(|stream| stream.label().to_string());

    SurfaceView {
        placeholder: PlaceholderView {
            hidden: state.has_seen,
            background: (!state.has_seen).then(|| PLACEHOLDER_BACKGROUND.to_string()),
            opacity: if state.has_video { 0.0 } else { 1.0 },
            initial: display_name.and_then(|name| name.chars().next()).map(|c| c.to_uppercase().collect()),
        },
        video: VideoView {
            muted: state.mute_audio,
            volume: props.map(|props| props.volume).unwrap_or(1.0),
            opacity: if state.has_video { 1.0 } else { 0.0 },
            fit,
            autoplay: true,
            plays_inline: true,
            picture_in_picture: false,
            stream,
        },
        name_banner: display_name.map(|name| NameBannerView {
            display_name: name.to_string(),
            size: state.label_size,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{
        SourceProps,
        StreamHandle,
    };
    use pretty_assertions::assert_eq;

    fn ann(kind: &str) -> Source {
        Source::new(
            "s1",
            SourceProps::default()
                .with("participantId", "p2")
                .with("displayName", "ann")
                .with("videoEnabled", true)
                .with("type", kind),
            None,
        )
    }

    #[test]
    fn nothing_to_show_renders_plain_placeholder() {
        let view = render(None, None, &RenderState::derive(None, None, None));
        assert!(view.shows_placeholder());
        assert_eq!(
            view.placeholder,
            PlaceholderView {
                hidden: false,
                background: Some(PLACEHOLDER_BACKGROUND.to_string()),
                opacity: 1.0,
                initial: None,
            }
        );
        assert_eq!(view.name_banner, None);
    }

    #[test]
    fn visible_participant_gets_initial_and_banner() {
        let props = Props::default();
        let source = ann("camera");
        let state = RenderState::derive(Some(&props), Some(&source), None).with_label_size(LabelSize::Medium);
        let view = render(Some(&props), Some(&source), &state);

        assert!(!view.shows_placeholder());
        assert_eq!(view.placeholder.initial.as_deref(), Some("A"));
        assert_eq!(view.video.fit, ObjectFit::Cover);
        assert_eq!(
            view.name_banner,
            Some(NameBannerView {
                display_name: "ann".to_string(),
                size: LabelSize::Medium,
            })
        );
    }

    #[test]
    fn stream_label_requires_props() {
        let source = Source::new("s1", SourceProps::default(), Some(StreamHandle::new("cam")));
        let state = RenderState::derive(None, Some(&source), None);
        assert_eq!(render(None, Some(&source), &state).video.stream, None);

        let props = Props::default();
        let state = RenderState::derive(Some(&props), Some(&source), None);
        assert_eq!(render(Some(&props), Some(&source), &state).video.stream.as_deref(), Some("cam"));
    }

    #[test]
    fn screen_share_is_contained() {
        let props = Props::default();
        let source = ann("screen");
        let state = RenderState::derive(Some(&props), Some(&source), None);
        assert_eq!(render(Some(&props), Some(&source), &state).video.fit, ObjectFit::Contain);
    }

    #[test]
    fn no_display_hides_placeholder_and_banner() {
        let props = Props {
            no_display: true,
            ..Props::default()
        };
        let source = ann("camera");
        let state = RenderState::derive(Some(&props), Some(&source), None);
        let view = render(Some(&props), Some(&source), &state);

        assert!(view.placeholder.hidden);
        assert_eq!(view.placeholder.background, None);
        assert_eq!(view.placeholder.initial, None);
        assert_eq!(view.name_banner, None);
    }
}
