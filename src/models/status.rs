use std::fmt;
use std::str::FromStr;

use crate::errors::CycleError;
use crate::models::homework::TrackedItem;

/// The review states the endpoint is known to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HomeworkStatus {
    Approved,
    Reviewing,
    Rejected,
}

impl HomeworkStatus {
    pub const ALL: [HomeworkStatus; 3] = [
        HomeworkStatus::Approved,
        HomeworkStatus::Reviewing,
        HomeworkStatus::Rejected,
    ];

    /// Wire code as sent by the endpoint.
    pub fn code(self) -> &'static str {
        match self {
            HomeworkStatus::Approved => "approved",
            HomeworkStatus::Reviewing => "reviewing",
            HomeworkStatus::Rejected => "rejected",
        }
    }

    pub fn verdict(self) -> &'static str {
        match self {
            HomeworkStatus::Approved => "Работа проверена: ревьюеру всё понравилось. Ура!",
            HomeworkStatus::Reviewing => "Работа взята на проверку ревьюером.",
            HomeworkStatus::Rejected => "Работа проверена: у ревьюера есть замечания.",
        }
    }
}

impl FromStr for HomeworkStatus {
    type Err = CycleError;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        HomeworkStatus::ALL
            .into_iter()
            .find(|s| s.code() == code)
            .ok_or_else(|| CycleError::UnknownStatusCode(format!("'{}'", code)))
    }
}

impl fmt::Display for HomeworkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.code())
    }
}

/// Render the notification text for a homework item.
///
/// Unknown or missing status codes are an error, never skipped: they mean
/// the remote service changed its protocol.
pub fn translate(item: &TrackedItem) -> Result<String, CycleError> {
    let code = item
        .status
        .as_deref()
        .ok_or_else(|| CycleError::UnknownStatusCode("status is missing".into()))?;
    let status: HomeworkStatus = code.parse()?;
    let name = item.homework_name.as_deref().unwrap_or_default();
    Ok(format!("Status changed for \"{}\". {}", name, status.verdict()))
}
