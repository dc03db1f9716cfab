//! Verbs and the ADL / cmi5 verb vocabulary.

use serde::{Deserialize, Serialize};

use super::LanguageMap;

const ADL_VERBS: &str = "http://adlnet.gov/expapi/verbs/";
const W3ID_ADL_VERBS: &str = "https://w3id.org/xapi/adl/verbs/";

/// The action between an actor and an activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verb {
    /// Verb IRI. Carries the meaning; `display` is cosmetic.
    pub id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<LanguageMap>,
}

impl Verb {
    /// Verb with an English display string.
    pub fn new(id: impl Into<String>, display_en: &str) -> Self {
        let mut display = LanguageMap::new();
        display.insert("en".to_string(), display_en.to_string());
        Self {
            id: id.into(),
            display: Some(display),
        }
    }
}

fn adl(word: &str) -> Verb {
    Verb::new(format!("{}{}", ADL_VERBS, word), word)
}

fn w3id(slug: &str, display: &str) -> Verb {
    Verb::new(format!("{}{}", W3ID_ADL_VERBS, slug), display)
}

pub fn answered() -> Verb {
    adl("answered")
}

pub fn asked() -> Verb {
    adl("asked")
}

pub fn attempted() -> Verb {
    adl("attempted")
}

pub fn attended() -> Verb {
    adl("attended")
}

pub fn commented() -> Verb {
    adl("commented")
}

pub fn completed() -> Verb {
    adl("completed")
}

pub fn exited() -> Verb {
    adl("exited")
}

pub fn experienced() -> Verb {
    adl("experienced")
}

pub fn failed() -> Verb {
    adl("failed")
}

pub fn imported() -> Verb {
    adl("imported")
}

pub fn initialized() -> Verb {
    adl("initialized")
}

pub fn interacted() -> Verb {
    adl("interacted")
}

pub fn launched() -> Verb {
    adl("launched")
}

pub fn mastered() -> Verb {
    adl("mastered")
}

pub fn passed() -> Verb {
    adl("passed")
}

pub fn preferred() -> Verb {
    adl("preferred")
}

pub fn progressed() -> Verb {
    adl("progressed")
}

pub fn registered() -> Verb {
    adl("registered")
}

pub fn responded() -> Verb {
    adl("responded")
}

pub fn resumed() -> Verb {
    adl("resumed")
}

pub fn scored() -> Verb {
    adl("scored")
}

pub fn shared() -> Verb {
    adl("shared")
}

pub fn suspended() -> Verb {
    adl("suspended")
}

pub fn terminated() -> Verb {
    adl("terminated")
}

pub fn voided() -> Verb {
    adl("voided")
}

/// Session abnormally terminated (cmi5).
pub fn abandoned() -> Verb {
    w3id("abandoned", "abandoned")
}

pub fn logged_in() -> Verb {
    w3id("logged-in", "logged in")
}

pub fn logged_out() -> Verb {
    w3id("logged-out", "logged out")
}

/// Criteria of the activity fulfilled (cmi5).
pub fn satisfied() -> Verb {
    w3id("satisfied", "satisfied")
}

/// Requirements met by other means than completing the activity (cmi5).
pub fn waived() -> Verb {
    w3id("waived", "waived")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adl_verbs_use_expapi_namespace() {
        assert_eq!(initialized().id, "http://adlnet.gov/expapi/verbs/initialized");
        assert_eq!(
            completed().display.unwrap().get("en").map(String::as_str),
            Some("completed")
        );
    }

    #[test]
    fn cmi5_verbs_use_w3id_namespace() {
        assert_eq!(logged_in().id, "https://w3id.org/xapi/adl/verbs/logged-in");
        assert_eq!(
            logged_in().display.unwrap().get("en").map(String::as_str),
            Some("logged in")
        );
    }
}
