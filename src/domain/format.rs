use rand::Rng;

use crate::domain::classify::{ImpactArea, Priority};

const CORPORATE_PHRASES: [&str; 10] = [
    "Let's circle back",
    "Synergize our efforts",
    "Move the needle",
    "Low-hanging fruit",
    "Think outside the box",
    "Deep dive",
    "Touch base",
    "Bandwidth",
    "Action items",
    "Leverage our synergies",
];

const CHANNELS: [&str; 4] = ["email", "Slack", "Teams message", "carrier pigeon"];

const CLOSING_NOTES: [&str; 4] = [
    "Let's make this our north star metric",
    "This is a real game-changer",
    "Time to move fast and fix things",
    "This will definitely move the needle",
];

/// Source of the cosmetic choices in a formatted ticket.
pub trait StyleSource: Send + Sync {
    /// Index in `0..len`. `len` is never zero.
    fn pick(&self, len: usize) -> usize;
    /// Quarter number in `1..=4`.
    fn quarter(&self) -> u8;
}

pub struct RandomStyle;

impl StyleSource for RandomStyle {
    fn pick(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }

    fn quarter(&self) -> u8 {
        rand::thread_rng().gen_range(1..=4)
    }
}

/// Always makes the same choices.
#[cfg(test)]
pub struct FixedStyle {
    pub index: usize,
    pub quarter: u8,
}

#[cfg(test)]
impl StyleSource for FixedStyle {
    fn pick(&self, len: usize) -> usize {
        self.index % len
    }

    fn quarter(&self) -> u8 {
        self.quarter.clamp(1, 4)
    }
}

fn choose<'a>(style: &dyn StyleSource, options: &[&'a str]) -> &'a str {
    options[style.pick(options.len()) % options.len()]
}

pub fn sarcastic_comment(style: &dyn StyleSource) -> String {
    let templates = [
        format!("As per my last {}...", choose(style, &CHANNELS)),
        format!("Let's {} on this one.", choose(style, &CORPORATE_PHRASES)),
        "I'm just trying to add value to the conversation here...".to_string(),
        "Per our previous sync (that you definitely attended)...".to_string(),
        "In the spirit of radical candor...".to_string(),
        "Let me play devil's advocate here (as if we needed more devils)...".to_string(),
    ];
    let index = style.pick(templates.len()) % templates.len();
    templates[index].clone()
}

pub fn priority_justification(priority: Priority) -> &'static str {
    match priority {
        Priority::P0 => "Because apparently everything is on fire 🔥",
        Priority::P1 => "Important enough to skip lunch, not important enough to skip coffee ☕",
        Priority::P2 => "Let's pretend this is urgent but we all know it's not 🎭",
        Priority::P3 => "File this under 'would be nice to have in the next decade' 📅",
    }
}

pub fn format_description(
    style: &dyn StyleSource,
    title: &str,
    description: &str,
    priority: Priority,
    impact_area: ImpactArea,
) -> String {
    let opener = sarcastic_comment(style);
    let quarter = style.quarter();
    let closing = choose(style, &CLOSING_NOTES);

    format!(
        "
{opener}

🎯 OBJECTIVE
{title}

📝 DESCRIPTION
{description}

⚡ PRIORITY: {priority_label}
{justification}

🎯 IMPACT AREA: {impact_label}

🔑 ACCEPTANCE CRITERIA
1. It actually works (wouldn't that be nice?)
2. Has been tested (and not just on your local machine)
3. Documentation exists (future us will thank present us)
4. Metrics are tracked (because what gets measured gets managed™)

💭 TERRY'S NOTES
- Aligned with our Q{quarter} OKRs (which I'm sure everyone has memorized)
- {closing}
- Remember: we're not just coding, we're \"crafting digital experiences\" 🎨

Please don't hesitate to reach out if you need any clarification. My virtual door is always open!

Best regards,
Terry 🤖
Your friendly neighborhood AI PM
",
        priority_label = priority.label(),
        justification = priority_justification(priority),
        impact_label = impact_area.label(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_style_is_reproducible() {
        let style = FixedStyle {
            index: 1,
            quarter: 3,
        };
        let first = format_description(
            &style,
            "Export CSV",
            "Let users export reports",
            Priority::P1,
            ImpactArea::Analytics,
        );
        let second = format_description(
            &style,
            "Export CSV",
            "Let users export reports",
            Priority::P1,
            ImpactArea::Analytics,
        );
        assert_eq!(first, second);
        assert!(first.contains("Let's Synergize our efforts on this one."));
        assert!(first.contains("Aligned with our Q3 OKRs"));
        assert!(first.contains("- This is a real game-changer"));
    }

    #[test]
    fn embeds_fields_and_labels() {
        let style = FixedStyle {
            index: 0,
            quarter: 1,
        };
        let text = format_description(
            &style,
            "Faster login",
            "Cut login latency in half",
            Priority::P0,
            ImpactArea::UserExperience,
        );
        assert!(text.contains("As per my last email..."));
        assert!(text.contains("🎯 OBJECTIVE\nFaster login\n"));
        assert!(text.contains("📝 DESCRIPTION\nCut login latency in half\n"));
        assert!(text.contains(&format!("⚡ PRIORITY: {}", Priority::P0.label())));
        assert!(text.contains(priority_justification(Priority::P0)));
        assert!(text.contains(&format!("🎯 IMPACT AREA: {}", ImpactArea::UserExperience.label())));
        assert!(text.contains("Aligned with our Q1 OKRs"));
    }

    #[test]
    fn random_style_stays_in_range() {
        let style = RandomStyle;
        for _ in 0..64 {
            assert!(style.pick(6) < 6);
            assert!((1..=4).contains(&style.quarter()));
        }
    }
}
