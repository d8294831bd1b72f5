//! Validated value types for ledger commands and stored event tags.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Maximum click reference length in characters.
pub const CLICK_REF_MAX: usize = 200;
/// Maximum spend reason length in characters.
pub const SPEND_REASON_MAX: usize = 50;
/// Maximum stored event type length in characters.
pub const EVENT_TYPE_MAX: usize = 64;

const CLICK_EARN: &str = "CLICK_EARN";
const SPEND_PREFIX: &str = "SPEND_";

/// Validation errors for ledger command inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerValidationError {
    EmptyReference,
    ReferenceTooLong { max: usize },
    NonPositiveAmount,
    EmptyReason,
    ReasonTooLong { max: usize },
    ReasonInvalidCharacters,
    EmptyEventType,
    EventTypeTooLong { max: usize },
    EventTypeInvalidCharacters,
    UnknownRewardKind { kind: String },
}

impl fmt::Display for LedgerValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyReference => write!(f, "ref must not be empty"),
            Self::ReferenceTooLong { max } => write!(f, "ref must be at most {max} characters"),
            Self::NonPositiveAmount => write!(f, "amount must be at least 1"),
            Self::EmptyReason => write!(f, "reason must not be empty"),
            Self::ReasonTooLong { max } => write!(f, "reason must be at most {max} characters"),
            Self::ReasonInvalidCharacters => write!(
                f,
                "reason may only contain letters, digits, spaces, hyphens, or underscores"
            ),
            Self::EmptyEventType => write!(f, "event type must not be empty"),
            Self::EventTypeTooLong { max } => {
                write!(f, "event type must be at most {max} characters")
            }
            Self::EventTypeInvalidCharacters => write!(
                f,
                "event type may only contain uppercase letters, digits, or underscores"
            ),
            Self::UnknownRewardKind { kind } => write!(f, "unknown daily reward: {kind}"),
        }
    }
}

impl std::error::Error for LedgerValidationError {}

/// Reference to the resource that triggered a click earn.
///
/// # Examples
/// ```
/// use seed_ledger::domain::ClickRef;
///
/// let click_ref = ClickRef::new(" linkA ").expect("valid ref");
/// assert_eq!(click_ref.as_ref(), "linkA");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClickRef(String);

impl ClickRef {
    /// Validate a reference, trimming surrounding whitespace first.
    ///
    /// Padded and unpadded spellings name the same reference and share a
    /// cooldown. Whitespace-only input is rejected as empty.
    pub fn new(value: impl AsRef<str>) -> Result<Self, LedgerValidationError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(LedgerValidationError::EmptyReference);
        }
        if trimmed.chars().count() > CLICK_REF_MAX {
            return Err(LedgerValidationError::ReferenceTooLong { max: CLICK_REF_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for ClickRef {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<ClickRef> for String {
    fn from(value: ClickRef) -> Self {
        value.0
    }
}

impl TryFrom<String> for ClickRef {
    type Error = LedgerValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Positive number of SEED debited by a spend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct SpendAmount(i64);

impl SpendAmount {
    pub fn new(value: i64) -> Result<Self, LedgerValidationError> {
        if value < 1 {
            return Err(LedgerValidationError::NonPositiveAmount);
        }
        Ok(Self(value))
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl From<SpendAmount> for i64 {
    fn from(value: SpendAmount) -> Self {
        value.0
    }
}

impl TryFrom<i64> for SpendAmount {
    type Error = LedgerValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Bounded classification of spend reasons used for metric labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpendCategory {
    Journal,
    Ai,
    Game,
    Other,
}

impl SpendCategory {
    /// Stable lowercase label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Journal => "journal",
            Self::Ai => "ai",
            Self::Game => "game",
            Self::Other => "other",
        }
    }
}

/// Normalised spend reason composed into a `SPEND_<REASON>` event type.
///
/// Input is case-insensitive. Spaces and hyphens fold to underscores and the
/// result must consist of `[A-Z0-9_]` only.
///
/// # Examples
/// ```
/// use seed_ledger::domain::{SpendCategory, SpendReason};
///
/// let reason = SpendReason::new("mini-game").expect("valid reason");
/// assert_eq!(reason.as_ref(), "MINI_GAME");
/// assert_eq!(reason.category(), SpendCategory::Other);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SpendReason(String);

impl SpendReason {
    pub fn new(value: impl AsRef<str>) -> Result<Self, LedgerValidationError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(LedgerValidationError::EmptyReason);
        }
        if trimmed.chars().count() > SPEND_REASON_MAX {
            return Err(LedgerValidationError::ReasonTooLong {
                max: SPEND_REASON_MAX,
            });
        }

        let normalised: String = trimmed
            .chars()
            .map(|ch| match ch {
                ' ' | '-' => '_',
                other => other.to_ascii_uppercase(),
            })
            .collect();
        if !normalised
            .chars()
            .all(|ch| ch.is_ascii_uppercase() || ch.is_ascii_digit() || ch == '_')
        {
            return Err(LedgerValidationError::ReasonInvalidCharacters);
        }
        Ok(Self(normalised))
    }

    pub fn category(&self) -> SpendCategory {
        match self.0.as_str() {
            "JOURNAL" => SpendCategory::Journal,
            "AI" => SpendCategory::Ai,
            "GAME" => SpendCategory::Game,
            _ => SpendCategory::Other,
        }
    }
}

impl AsRef<str> for SpendReason {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<SpendReason> for String {
    fn from(value: SpendReason) -> Self {
        value.0
    }
}

impl TryFrom<String> for SpendReason {
    type Error = LedgerValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Classifier tag stored on every ledger event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub struct EventType(String);

impl EventType {
    /// Validate an uppercase tag.
    pub fn new(value: impl AsRef<str>) -> Result<Self, LedgerValidationError> {
        let value = value.as_ref();
        if value.is_empty() {
            return Err(LedgerValidationError::EmptyEventType);
        }
        if value.chars().count() > EVENT_TYPE_MAX {
            return Err(LedgerValidationError::EventTypeTooLong {
                max: EVENT_TYPE_MAX,
            });
        }
        if !value
            .chars()
            .all(|ch| ch.is_ascii_uppercase() || ch.is_ascii_digit() || ch == '_')
        {
            return Err(LedgerValidationError::EventTypeInvalidCharacters);
        }
        Ok(Self(value.to_owned()))
    }

    /// Wrap a tag read back from storage without re-validating it.
    pub fn from_stored(value: String) -> Self {
        Self(value)
    }

    pub fn click_earn() -> Self {
        Self(CLICK_EARN.to_owned())
    }

    /// `SPEND_<REASON>` for a normalised reason.
    pub fn spend(reason: &SpendReason) -> Self {
        Self(format!("{SPEND_PREFIX}{}", reason.as_ref()))
    }

    pub fn is_click_earn(&self) -> bool {
        self.0 == CLICK_EARN
    }
}

impl AsRef<str> for EventType {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EventType> for String {
    fn from(value: EventType) -> Self {
        value.0
    }
}

impl From<String> for EventType {
    fn from(value: String) -> Self {
        Self::from_stored(value)
    }
}

/// Recurring rewards that may be claimed once per UTC day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DailyRewardKind {
    Journal,
}

impl DailyRewardKind {
    /// Parse the path segment naming a reward, case-insensitively.
    pub fn parse(value: &str) -> Result<Self, LedgerValidationError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "journal" => Ok(Self::Journal),
            _ => Err(LedgerValidationError::UnknownRewardKind {
                kind: value.to_owned(),
            }),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Journal => "journal",
        }
    }

    pub fn event_type(self) -> EventType {
        match self {
            Self::Journal => EventType::from_stored("JOURNAL_DAILY".to_owned()),
        }
    }

    /// Audit payload stored alongside the reward event.
    pub fn meta(self) -> Value {
        json!({ "source": self.as_str() })
    }
}
