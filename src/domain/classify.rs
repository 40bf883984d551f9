use crate::domain::scores::ScoreSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    P0,
    P1,
    P2,
    P3,
}

impl Priority {
    pub fn code(&self) -> &'static str {
        match self {
            Priority::P0 => "P0",
            Priority::P1 => "P1",
            Priority::P2 => "P2",
            Priority::P3 => "P3",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Priority::P0 => "P0 - Drop everything and do this now!",
            Priority::P1 => "P1 - Very important, but you can finish your coffee first",
            Priority::P2 => "P2 - Important, but not as important as your weekend plans",
            Priority::P3 => "P3 - We'll get to it when we get to it",
        }
    }

    /// Accepts either the bare code or a full label ("P1 - ...").
    pub fn from_code(value: &str) -> Option<Self> {
        match value.split_whitespace().next()?.to_uppercase().as_str() {
            "P0" => Some(Priority::P0),
            "P1" => Some(Priority::P1),
            "P2" => Some(Priority::P2),
            "P3" => Some(Priority::P3),
            _ => None,
        }
    }

    pub fn from_total(total: f64) -> Self {
        if total >= 80.0 {
            Priority::P0
        } else if total >= 60.0 {
            Priority::P1
        } else if total >= 40.0 {
            Priority::P2
        } else {
            Priority::P3
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpactArea {
    CoreProduct,
    UserExperience,
    TechnicalDebt,
    Infrastructure,
    Analytics,
}

impl ImpactArea {
    pub const ALL: [ImpactArea; 5] = [
        ImpactArea::CoreProduct,
        ImpactArea::UserExperience,
        ImpactArea::TechnicalDebt,
        ImpactArea::Infrastructure,
        ImpactArea::Analytics,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ImpactArea::CoreProduct => "Core Product (you know, the thing that makes us money)",
            ImpactArea::UserExperience => "User Experience (because happy users = happy life)",
            ImpactArea::TechnicalDebt => "Technical Debt (the monster under our codebase)",
            ImpactArea::Infrastructure => "Infrastructure (keeping the lights on)",
            ImpactArea::Analytics => "Analytics (numbers that make executives happy)",
        }
    }

    fn weight(&self, scores: &ScoreSet) -> f64 {
        match self {
            ImpactArea::CoreProduct => scores.revenue_potential,
            ImpactArea::UserExperience => scores.user_impact,
            ImpactArea::TechnicalDebt => scores.technical_complexity,
            ImpactArea::Infrastructure => {
                (scores.technical_complexity + scores.strategic_alignment) / 2.0
            }
            ImpactArea::Analytics => scores.strategic_alignment,
        }
    }
}

/// Weighted priority score. Summed in tenths so whole-number inputs land
/// exactly on the threshold boundaries.
pub fn priority_total(scores: &ScoreSet) -> f64 {
    let tenths = 4.0 * scores.revenue_potential
        + 3.0 * scores.user_impact
        + 2.0 * scores.strategic_alignment
        + (100.0 - scores.technical_complexity);
    tenths / 10.0
}

pub fn determine_priority(scores: &ScoreSet) -> Priority {
    Priority::from_total(priority_total(scores))
}

/// Highest weighted area; ties resolve to the first area in declaration order.
pub fn determine_impact_area(scores: &ScoreSet) -> ImpactArea {
    let mut best = ImpactArea::ALL[0];
    let mut best_weight = best.weight(scores);
    for area in &ImpactArea::ALL[1..] {
        let weight = area.weight(scores);
        if weight > best_weight {
            best = *area;
            best_weight = weight;
        }
    }
    best
}

pub fn classify(scores: &ScoreSet) -> (Priority, ImpactArea) {
    (determine_priority(scores), determine_impact_area(scores))
}
