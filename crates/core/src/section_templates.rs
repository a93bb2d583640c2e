//! Default section layouts instantiated when a deck is created.
//!
//! Each format seeds its conventional zones with the structural rules those
//! zones carry (command zone size caps, mainboard singleton, sideboard
//! limits). Commander-family color identity is deck-specific and is applied
//! by the caller once the commander is known, not by the template.

use crate::card::Format;
use crate::composition::SectionRules;

/// One section to create, in position order.
#[derive(Debug, Clone)]
pub struct SectionTemplate {
    pub name: &'static str,
    pub description: Option<&'static str>,
    pub rules: Option<SectionRules>,
}

fn max_cards(limit: i32) -> Option<SectionRules> {
    Some(SectionRules {
        max_cards: Some(limit),
        ..Default::default()
    })
}

fn singleton() -> Option<SectionRules> {
    Some(SectionRules {
        singleton: Some(true),
        ..Default::default()
    })
}

const CONSIDERING: SectionTemplate = SectionTemplate {
    name: "Considering",
    description: Some("Cards to consider adding"),
    rules: None,
};

const MAYBEBOARD: SectionTemplate = SectionTemplate {
    name: "Maybeboard",
    description: Some("Cards that might be added later"),
    rules: None,
};

/// Section templates for a format, in position order (positions are the
/// vector indices).
pub fn templates_for(format: Format) -> Vec<SectionTemplate> {
    match format {
        Format::Commander => vec![
            SectionTemplate {
                name: "Command Zone",
                description: None,
                rules: max_cards(2),
            },
            SectionTemplate {
                name: "Mainboard",
                description: None,
                rules: singleton(),
            },
            CONSIDERING,
            MAYBEBOARD,
        ],
        Format::Duel => vec![
            SectionTemplate {
                name: "Command Zone",
                description: None,
                rules: max_cards(1),
            },
            SectionTemplate {
                name: "Mainboard",
                description: None,
                rules: singleton(),
            },
            SectionTemplate {
                name: "Sideboard",
                description: None,
                rules: max_cards(15),
            },
            CONSIDERING,
        ],
        Format::Brawl => vec![
            SectionTemplate {
                name: "Command Zone",
                description: None,
                rules: max_cards(1),
            },
            SectionTemplate {
                name: "Mainboard",
                description: None,
                rules: singleton(),
            },
            CONSIDERING,
        ],
        Format::Standard
        | Format::Modern
        | Format::Pioneer
        | Format::Legacy
        | Format::Vintage
        | Format::Pauper => vec![
            SectionTemplate {
                name: "Mainboard",
                description: None,
                rules: max_cards(60),
            },
            SectionTemplate {
                name: "Sideboard",
                description: None,
                rules: max_cards(15),
            },
            CONSIDERING,
        ],
        Format::Limited => vec![
            SectionTemplate {
                name: "Mainboard",
                description: None,
                rules: max_cards(40),
            },
            SectionTemplate {
                name: "Sideboard",
                description: None,
                rules: None,
            },
            CONSIDERING,
        ],
        Format::Casual => vec![
            SectionTemplate {
                name: "Mainboard",
                description: None,
                rules: None,
            },
            CONSIDERING,
            MAYBEBOARD,
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::ALL_FORMATS;

    #[test]
    fn every_format_has_a_mainboard() {
        for format in ALL_FORMATS {
            let templates = templates_for(format);
            assert!(
                templates.iter().any(|t| t.name == "Mainboard"),
                "{format} is missing a mainboard"
            );
        }
    }

    #[test]
    fn commander_mainboard_is_singleton() {
        let templates = templates_for(Format::Commander);
        let mainboard = templates.iter().find(|t| t.name == "Mainboard").unwrap();
        assert_eq!(
            mainboard.rules.as_ref().unwrap().singleton,
            Some(true)
        );
    }

    #[test]
    fn commander_command_zone_allows_partners() {
        let templates = templates_for(Format::Commander);
        assert_eq!(
            templates[0].rules.as_ref().unwrap().max_cards,
            Some(2)
        );
    }

    #[test]
    fn constructed_sideboard_caps_at_fifteen() {
        let templates = templates_for(Format::Modern);
        let sideboard = templates.iter().find(|t| t.name == "Sideboard").unwrap();
        assert_eq!(sideboard.rules.as_ref().unwrap().max_cards, Some(15));
    }

    #[test]
    fn section_names_are_unique_within_a_format() {
        for format in ALL_FORMATS {
            let templates = templates_for(format);
            let mut names: Vec<_> = templates.iter().map(|t| t.name).collect();
            names.sort_unstable();
            names.dedup();
            assert_eq!(names.len(), templates.len());
        }
    }
}
