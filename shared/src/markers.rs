//! Marker-class grammar used by server-rendered markup.
//!
//! Elements opt into client behavior through a *role* class (for example
//! `_voltJS_urlChanger`) and carry their parameters in `prefix@payload`
//! marker classes (for example `_voltJS_url@L21hbmFnZXIv`).

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

/// Accepts what `atob` accepts: padding optional, non-zero trailing bits ignored.
const URL_PAYLOAD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Prefix of the class naming a display group of the exclusive selector.
pub const DISPLAY_GROUP_PREFIX: &str = "_voltJS_changeValue_";
/// Class that hides a display group member.
pub const HIDEABLE_CLASS: &str = "at_hideable";
/// Selector value meaning "no group selected".
pub const NO_SELECTION: &str = "-1";
/// Hidden form field injected by the back button.
pub const BACK_BUTTON_FIELD: &str = "_voltJS_backButton";

pub const TO_SHOW_CLASS: &str = "_voltJS_toShow";
pub const EXPAND_CONTAINER_CLASS: &str = "_voltJS_expandContainer";
pub const TO_EXPAND_CLASS: &str = "_voltJS_toExpand";
pub const DISABLE_CONTAINER_CLASS: &str = "_voltJS_disableContainer";
pub const TO_DISABLE_CLASS: &str = "_voltJS_toDisable";

pub fn display_group_class(value: &str) -> String {
    format!("{DISPLAY_GROUP_PREFIX}{value}")
}

/// Behavior selected by a payload-less role class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    TestForNegative,
    UrlChanger,
    BackButton,
    ChangeDisplay,
    PlotHighlight,
    PlotHighlightInput,
    ToggleShow,
    DisableCascade,
    Expand,
    CloseX,
    ApplyModel,
    RequestLink,
    PreDisabled,
}

impl Role {
    pub const ALL: [Role; 13] = [
        Role::TestForNegative,
        Role::UrlChanger,
        Role::BackButton,
        Role::ChangeDisplay,
        Role::PlotHighlight,
        Role::PlotHighlightInput,
        Role::ToggleShow,
        Role::DisableCascade,
        Role::Expand,
        Role::CloseX,
        Role::ApplyModel,
        Role::RequestLink,
        Role::PreDisabled,
    ];

    pub fn class_name(self) -> &'static str {
        match self {
            Role::TestForNegative => "_voltJS_testForNegative",
            Role::UrlChanger => "_voltJS_urlChanger",
            Role::BackButton => "_voltJS_backButton",
            Role::ChangeDisplay => "_voltJS_ChangeDispValue",
            Role::PlotHighlight => "_voltJS_plotHighlight",
            Role::PlotHighlightInput => "_voltJS_plotHighlightInput",
            Role::ToggleShow => "_voltJS_toggleShow",
            Role::DisableCascade => "_voltJS_Disable",
            Role::Expand => "_voltJS_Expand",
            Role::CloseX => "closeX",
            Role::ApplyModel => "_voltJS_applyModel",
            Role::RequestLink => "_voltJS_requestLink",
            Role::PreDisabled => "_disabled",
        }
    }

    pub fn selector(self) -> String {
        format!(".{}", self.class_name())
    }

    pub fn from_class(class: &str) -> Option<Role> {
        Role::ALL.into_iter().find(|role| role.class_name() == class)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerFamily {
    IfNegativeDisable,
    IfNegativeEnable,
    Url,
    HighlightCurve,
    Model,
}

impl MarkerFamily {
    pub const ALL: [MarkerFamily; 5] = [
        MarkerFamily::IfNegativeDisable,
        MarkerFamily::IfNegativeEnable,
        MarkerFamily::Url,
        MarkerFamily::HighlightCurve,
        MarkerFamily::Model,
    ];

    /// Class prefix including the trailing separator.
    pub fn prefix(self) -> &'static str {
        match self {
            MarkerFamily::IfNegativeDisable => "_voltJS_ifNegativeDisable@",
            MarkerFamily::IfNegativeEnable => "_voltJS_ifNegativeEnable@",
            MarkerFamily::Url => "_voltJS_url@",
            MarkerFamily::HighlightCurve => "_voltJS_highlightCurve@",
            MarkerFamily::Model => "_voltJS_model@",
        }
    }
}

/// A decoded `prefix@payload` marker.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerClass {
    /// Disable every element of the class while the source value is negative.
    IfNegativeDisable(String),
    /// Enable every element of the class only while the source value is negative.
    IfNegativeEnable(String),
    /// Navigation target, already decoded from base64.
    Url(String),
    HighlightCurve(u32),
    Model(u32),
}

impl MarkerClass {
    /// Parse one class name.
    ///
    /// Returns `None` for classes that are not markers and `Some(Err(_))` for
    /// markers whose payload cannot be decoded.
    pub fn parse(class: &str) -> Option<Result<MarkerClass, MarkerError>> {
        let family = MarkerFamily::ALL
            .into_iter()
            .find(|family| class.starts_with(family.prefix()))?;
        let payload = &class[family.prefix().len()..];
        Some(Self::decode(family, payload))
    }

    fn decode(family: MarkerFamily, payload: &str) -> Result<MarkerClass, MarkerError> {
        if payload.is_empty() {
            return Err(MarkerError::EmptyPayload { prefix: family.prefix() });
        }
        match family {
            MarkerFamily::IfNegativeDisable => Ok(MarkerClass::IfNegativeDisable(payload.to_string())),
            MarkerFamily::IfNegativeEnable => Ok(MarkerClass::IfNegativeEnable(payload.to_string())),
            MarkerFamily::Url => decode_url(payload).map(MarkerClass::Url),
            MarkerFamily::HighlightCurve => {
                parse_number(family, payload).map(MarkerClass::HighlightCurve)
            }
            MarkerFamily::Model => parse_number(family, payload).map(MarkerClass::Model),
        }
    }

    pub fn family(&self) -> MarkerFamily {
        match self {
            MarkerClass::IfNegativeDisable(_) => MarkerFamily::IfNegativeDisable,
            MarkerClass::IfNegativeEnable(_) => MarkerFamily::IfNegativeEnable,
            MarkerClass::Url(_) => MarkerFamily::Url,
            MarkerClass::HighlightCurve(_) => MarkerFamily::HighlightCurve,
            MarkerClass::Model(_) => MarkerFamily::Model,
        }
    }
}

fn decode_url(payload: &str) -> Result<String, MarkerError> {
    let bytes = URL_PAYLOAD
        .decode(payload)
        .map_err(|error| MarkerError::InvalidBase64 {
            payload: payload.to_string(),
            reason: error.to_string(),
        })?;
    String::from_utf8(bytes).map_err(|_| MarkerError::InvalidUtf8 {
        payload: payload.to_string(),
    })
}

fn parse_number(family: MarkerFamily, payload: &str) -> Result<u32, MarkerError> {
    payload.parse::<u32>().map_err(|_| MarkerError::InvalidNumber {
        prefix: family.prefix(),
        payload: payload.to_string(),
    })
}

/// Markers found in one element's class attribute.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedClassList {
    pub roles: Vec<Role>,
    pub markers: Vec<MarkerClass>,
    pub errors: Vec<MarkerError>,
}

impl ParsedClassList {
    pub fn parse(class_attribute: &str) -> Self {
        let mut parsed = Self::default();
        for class in class_attribute.split_whitespace() {
            if let Some(role) = Role::from_class(class) {
                parsed.roles.push(role);
            } else if let Some(marker) = MarkerClass::parse(class) {
                match marker {
                    Ok(marker) => parsed.markers.push(marker),
                    Err(error) => parsed.errors.push(error),
                }
            }
        }
        parsed
    }

    pub fn markers_of(&self, family: MarkerFamily) -> impl Iterator<Item = &MarkerClass> {
        self.markers.iter().filter(move |marker| marker.family() == family)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MarkerError {
    #[error("marker '{prefix}' has an empty payload")]
    EmptyPayload { prefix: &'static str },
    #[error("marker payload '{payload}' is not valid base64: {reason}")]
    InvalidBase64 { payload: String, reason: String },
    #[error("marker payload '{payload}' does not decode to UTF-8 text")]
    InvalidUtf8 { payload: String },
    #[error("marker '{prefix}{payload}' does not carry a numeric identifier")]
    InvalidNumber { prefix: &'static str, payload: String },
    #[error("element carries {count} URL markers, expected at most one")]
    ConflictingUrls { count: usize },
}
