//! Presentation-side view models for the administrative surface: which
//! field groups an editing form shows, and which columns a list shows.

use crate::storage::entity::language_record::{self, FileType};
use crate::storage::entity::speaker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fieldset {
    pub name: &'static str,
    pub fields: &'static [&'static str],
}

/// Add view for new records, change view for existing ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormView {
    Add,
    Change,
}

const BASIC: Fieldset = Fieldset {
    name: "Basic information",
    fields: &[
        "onomatopoeia_text",
        "meaning",
        "usage_example",
        "phonetic_notation",
        "language_frequency",
    ],
};

const FILE: Fieldset = Fieldset {
    name: "File",
    fields: &["file_type", "file_path", "thumbnail_path", "youtube_url"],
};

const LANGUAGE_RECORD_ADD: [Fieldset; 4] = [
    BASIC,
    FILE,
    Fieldset {
        name: "Relations",
        fields: &["speaker", "onomatopoeia_type"],
    },
    Fieldset {
        name: "Metadata",
        fields: &["title", "description", "recorded_date", "notes"],
    },
];

const LANGUAGE_RECORD_CHANGE: [Fieldset; 4] = [
    BASIC,
    FILE,
    Fieldset {
        name: "Relations",
        fields: &["speaker", "onomatopoeia_type", "village"],
    },
    Fieldset {
        name: "Metadata",
        fields: &[
            "title",
            "description",
            "recorded_date",
            "notes",
            "created_at",
            "updated_at",
        ],
    },
];

impl FormView {
    pub fn for_record(is_new: bool) -> Self {
        if is_new {
            FormView::Add
        } else {
            FormView::Change
        }
    }

    /// Language record field groups. The add view has no village selector:
    /// the village comes from the speaker.
    pub fn language_record_fieldsets(&self) -> &'static [Fieldset] {
        match self {
            FormView::Add => &LANGUAGE_RECORD_ADD,
            FormView::Change => &LANGUAGE_RECORD_CHANGE,
        }
    }

    pub fn language_record_readonly(&self) -> &'static [&'static str] {
        match self {
            FormView::Add => &[],
            FormView::Change => &["created_at", "updated_at"],
        }
    }
}

pub const VILLAGE_COLUMNS: &[&str] = &["name", "latitude", "longitude"];
pub const SPEAKER_COLUMNS: &[&str] = &["speaker_id", "age_range", "gender", "village", "consent_video"];
pub const ONOMATOPOEIA_TYPE_COLUMNS: &[&str] = &["type_code", "type_name"];
pub const LANGUAGE_RECORD_COLUMNS: &[&str] = &[
    "title / onomatopoeia",
    "file_type",
    "village",
    "speaker",
    "language_frequency",
    "recorded_date",
];
pub const GEOGRAPHIC_RECORD_COLUMNS: &[&str] = &["title", "content_type", "village", "captured_date"];

/// Video footage is only shown publicly when its speaker consented.
pub fn video_publicly_viewable(
    record: &language_record::Model,
    speaker: Option<&speaker::Model>,
) -> bool {
    if record.file_type != FileType::Video {
        return true;
    }
    speaker.map(|s| s.consent_video).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(view: FormView) -> Vec<&'static str> {
        view.language_record_fieldsets()
            .iter()
            .flat_map(|fs| fs.fields.iter().copied())
            .collect()
    }

    #[test]
    fn add_view_hides_village_and_timestamps() {
        let view = FormView::for_record(true);
        assert_eq!(view, FormView::Add);
        let f = fields(view);
        assert!(!f.contains(&"village"));
        assert!(!f.contains(&"created_at"));
        assert!(f.contains(&"speaker"));
        assert!(view.language_record_readonly().is_empty());
    }

    #[test]
    fn change_view_shows_village() {
        let view = FormView::for_record(false);
        let f = fields(view);
        assert!(f.contains(&"village"));
        assert!(f.contains(&"updated_at"));
        assert_eq!(view.language_record_readonly(), ["created_at", "updated_at"]);
    }
}
