use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::classify::{ImpactArea, Priority, classify};
use crate::domain::format::{RandomStyle, StyleSource, format_description};
use crate::domain::scores::ScoreSet;

pub const TICKET_PREFIX: &str = "TERRY-";

#[derive(Debug, Clone)]
pub struct Ticket {
    pub id: String,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub impact_area: ImpactArea,
    pub scores: ScoreSet,
}

impl Ticket {
    pub fn issue_payload(&self) -> IssuePayload {
        IssuePayload {
            title: self.title.clone(),
            description: self.description.clone(),
            priority: self.priority.code().to_string(),
            impact_area: self.impact_area.label().to_string(),
            scores: self.scores,
        }
    }

    pub fn export(&self) -> TicketExport {
        TicketExport {
            id: self.id.clone(),
            title: self.title.clone(),
            priority: self.priority.code().to_string(),
            impact_area: self.impact_area.label().to_string(),
            description: self.description.clone(),
            scores: self.scores,
        }
    }
}

/// What gets submitted to an issue tracker (and cached when that fails).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssuePayload {
    pub title: String,
    pub description: String,
    pub priority: String,
    pub impact_area: String,
    #[serde(default)]
    pub scores: ScoreSet,
}

/// On-disk form written by `--output`.
#[derive(Debug, Clone, Serialize)]
pub struct TicketExport {
    pub id: String,
    pub title: String,
    pub priority: String,
    pub impact_area: String,
    pub description: String,
    pub scores: ScoreSet,
}

pub fn generate_ticket_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("{TICKET_PREFIX}{}", hex[..8].to_uppercase())
}

#[derive(Clone)]
pub struct TicketFactory {
    style: Arc<dyn StyleSource>,
}

impl Default for TicketFactory {
    fn default() -> Self {
        Self::new(Arc::new(RandomStyle))
    }
}

impl TicketFactory {
    pub fn new(style: Arc<dyn StyleSource>) -> Self {
        Self { style }
    }

    pub fn create(&self, title: &str, description: &str, scores: ScoreSet) -> Ticket {
        let (priority, impact_area) = classify(&scores);
        let formatted = format_description(
            self.style.as_ref(),
            title,
            description,
            priority,
            impact_area,
        );

        Ticket {
            id: generate_ticket_id(),
            title: title.to_string(),
            description: formatted,
            priority,
            impact_area,
            scores,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::format::FixedStyle;

    fn fixed_factory() -> TicketFactory {
        TicketFactory::new(Arc::new(FixedStyle {
            index: 2,
            quarter: 4,
        }))
    }

    #[test]
    fn ids_carry_prefix_and_uppercase_hex() {
        let id = generate_ticket_id();
        let suffix = id.strip_prefix(TICKET_PREFIX).unwrap();
        assert_eq!(suffix.len(), 8);
        assert!(
            suffix
                .chars()
                .all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c))
        );
        assert_ne!(generate_ticket_id(), id);
    }

    #[test]
    fn creates_classified_ticket() {
        let ticket = fixed_factory().create(
            "Billing retries",
            "Retry failed card charges",
            ScoreSet::new(100.0, 100.0, 0.0, 100.0),
        );
        assert_eq!(ticket.title, "Billing retries");
        assert_eq!(ticket.priority, Priority::P0);
        assert_eq!(ticket.impact_area, ImpactArea::CoreProduct);
        assert!(ticket.description.contains("Retry failed card charges"));
        assert!(ticket.description.contains("Aligned with our Q4 OKRs"));
    }

    #[test]
    fn style_does_not_affect_classification() {
        let scores = ScoreSet::new(20.0, 85.0, 40.0, 30.0);
        let random = TicketFactory::default().create("t", "d", scores);
        let fixed = fixed_factory().create("t", "d", scores);
        assert_eq!(random.priority, fixed.priority);
        assert_eq!(random.impact_area, fixed.impact_area);
        assert_eq!(random.scores, scores);
    }

    #[test]
    fn payload_carries_code_label_and_scores() {
        let ticket = fixed_factory().create("t", "d", ScoreSet::default());
        let payload = ticket.issue_payload();
        assert_eq!(payload.priority, "P2");
        assert_eq!(payload.impact_area, ImpactArea::CoreProduct.label());
        assert_eq!(payload.scores, ScoreSet::default());
        assert_eq!(payload.description, ticket.description);
    }
}
