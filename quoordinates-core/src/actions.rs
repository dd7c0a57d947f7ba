// ABOUTME: The three button-triggered follow-up actions and their wire identifiers
// ABOUTME: Parses button custom IDs and builds the shared follow-up button row

use crate::traits::ButtonDescriptor;

/// A classified button action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonAction {
    /// Generate an image from the message
    Illustrate,
    /// Post more quotes related to the message
    ExpandQuotes,
    /// Summarize the message in a sentence or two
    Summarize,
}

impl ButtonAction {
    pub const ALL: [ButtonAction; 3] = [
        ButtonAction::Illustrate,
        ButtonAction::ExpandQuotes,
        ButtonAction::Summarize,
    ];

    /// Classify a button custom ID. Returns `None` for buttons this bot does not own.
    ///
    /// Also accepts the IDs carried by messages posted before the current naming.
    pub fn parse(custom_id: &str) -> Option<Self> {
        match custom_id {
            "illustrate" | "button_id" => Some(ButtonAction::Illustrate),
            "expand-quotes" | "quos_learn_more" => Some(ButtonAction::ExpandQuotes),
            "summarize" => Some(ButtonAction::Summarize),
            _ => None,
        }
    }

    /// Custom ID emitted on new buttons
    pub fn custom_id(self) -> &'static str {
        match self {
            ButtonAction::Illustrate => "illustrate",
            ButtonAction::ExpandQuotes => "expand-quotes",
            ButtonAction::Summarize => "summarize",
        }
    }

    /// Command this action is accounted against by the workflow tracker
    pub fn logical_name(self) -> &'static str {
        match self {
            ButtonAction::Illustrate => "aart",
            ButtonAction::ExpandQuotes => "quos",
            ButtonAction::Summarize => "summarize",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ButtonAction::Illustrate => "Make Aart (+1 aart)",
            ButtonAction::ExpandQuotes => "Learn More (+1 quos)",
            ButtonAction::Summarize => "Summarize (+1 quos)",
        }
    }

    pub fn button(self) -> ButtonDescriptor {
        ButtonDescriptor::primary(self.custom_id(), self.label())
    }
}

/// Fresh illustrate / expand-quotes / summarize row attached to every posted quote
pub fn follow_up_row() -> Vec<ButtonDescriptor> {
    ButtonAction::ALL.iter().map(|a| a.button()).collect()
}
