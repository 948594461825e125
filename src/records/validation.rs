use crate::media::UploadedFile;
use crate::records::embed::non_blank;
use crate::storage::entity::geographic_record::ContentType;
use crate::storage::entity::language_record::{FileType, LanguageFrequency};
use crate::storage::repository::{NewOnomatopoeiaType, NewSpeaker, NewVillage};
use chrono::NaiveDate;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

pub const MSG_NEITHER_FILE_NOR_LINK: &str = "Provide either a file or a YouTube URL.";
pub const MSG_BOTH_FILE_AND_LINK: &str =
    "You cannot provide both a file and a YouTube URL. Choose one.";
pub const MSG_REQUIRED: &str = "This field is required.";
pub const MSG_INVALID_URL: &str = "Enter a valid URL.";
pub const MSG_INVALID_NUMBER: &str = "Enter a number.";

pub const MAX_VILLAGE_NAME: usize = 100;
pub const MAX_SPEAKER_ID: usize = 50;
pub const MAX_TYPE_CODE: usize = 10;
pub const MAX_TYPE_NAME: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// `None` for errors that concern the submission as a whole.
    pub field: Option<&'static str>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: Some(field),
            message: message.into(),
        });
    }

    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: None,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    #[cfg(test)]
    pub fn for_field(&self, field: &str) -> Option<&FieldError> {
        self.errors.iter().find(|e| e.field == Some(field))
    }

    #[cfg(test)]
    pub fn non_field(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter().filter(|e| e.field.is_none())
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|e| match e.field {
                Some(field) => format!("{}: {}", field, e.message),
                None => e.message.clone(),
            })
            .collect();
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Where a record's primary media comes from once validated.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaSource {
    /// New binary to hand to media storage.
    Upload(UploadedFile),
    /// URL of a file already in media storage.
    Stored(String),
    YouTube(String),
}

/// Raw language-record form data. Choice fields arrive as codes and ids as
/// plain numbers; nothing here has been checked yet.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LanguageRecordSubmission {
    pub onomatopoeia_text: Option<String>,
    pub meaning: Option<String>,
    pub usage_example: Option<String>,
    pub phonetic_notation: Option<String>,
    pub language_frequency: Option<String>,
    pub file_type: Option<String>,
    pub file_path: Option<String>,
    pub thumbnail_path: Option<String>,
    pub youtube_url: Option<String>,
    pub speaker: Option<i32>,
    pub onomatopoeia_type: Option<i32>,
    pub village: Option<i32>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub recorded_date: Option<NaiveDate>,
    pub notes: Option<String>,
    #[serde(skip)]
    pub file: Option<UploadedFile>,
    #[serde(skip)]
    pub thumbnail: Option<UploadedFile>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedLanguageRecord {
    pub onomatopoeia_text: Option<String>,
    pub meaning: Option<String>,
    pub usage_example: Option<String>,
    pub phonetic_notation: Option<String>,
    pub language_frequency: Option<LanguageFrequency>,
    pub file_type: FileType,
    pub media: MediaSource,
    pub thumbnail: Option<MediaSource>,
    pub speaker_id: i32,
    pub onomatopoeia_type_id: Option<i32>,
    pub village_id: Option<i32>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub recorded_date: NaiveDate,
    pub notes: String,
}

impl LanguageRecordSubmission {
    pub fn validate(self) -> Result<ValidatedLanguageRecord, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let file_type = required_choice::<FileType>(
            &mut errors,
            "file_type",
            self.file_type.as_deref(),
            "Select a file type.",
        );
        let language_frequency = optional_choice::<LanguageFrequency>(
            &mut errors,
            "language_frequency",
            self.language_frequency.as_deref(),
        );
        if self.speaker.is_none() {
            errors.add("speaker", "Select a speaker.");
        }
        if self.recorded_date.is_none() {
            errors.add("recorded_date", MSG_REQUIRED);
        }

        let onomatopoeia_text = clean(self.onomatopoeia_text);
        let meaning = clean(self.meaning);
        let usage_example = clean(self.usage_example);
        let title = clean(self.title);

        let media = match resolve_media(&mut errors, self.file, self.file_path, self.youtube_url) {
            Some(MediaSource::YouTube(url)) => {
                if title.is_none() {
                    errors.add("title", "Enter a title when registering a YouTube video.");
                }
                Some(MediaSource::YouTube(url))
            }
            Some(file) => {
                if onomatopoeia_text.is_none() {
                    errors.add("onomatopoeia_text", "Enter the onomatopoeia.");
                }
                if meaning.is_none() {
                    errors.add("meaning", "Enter the meaning.");
                }
                if usage_example.is_none() {
                    errors.add("usage_example", "Enter a usage example.");
                }
                if self.onomatopoeia_type.is_none() {
                    errors.add("onomatopoeia_type", "Select an onomatopoeia type.");
                }
                Some(file)
            }
            None => None,
        };

        let thumbnail = resolve_thumbnail(&mut errors, self.thumbnail, self.thumbnail_path);

        match (file_type, self.speaker, self.recorded_date, media) {
            (Some(file_type), Some(speaker_id), Some(recorded_date), Some(media))
                if errors.is_empty() =>
            {
                Ok(ValidatedLanguageRecord {
                    onomatopoeia_text,
                    meaning,
                    usage_example,
                    phonetic_notation: clean(self.phonetic_notation),
                    language_frequency,
                    file_type,
                    media,
                    thumbnail,
                    speaker_id,
                    onomatopoeia_type_id: self.onomatopoeia_type,
                    village_id: self.village,
                    title,
                    description: clean(self.description),
                    recorded_date,
                    notes: clean(self.notes).unwrap_or_default(),
                })
            }
            _ => Err(errors),
        }
    }
}

/// Raw geographic-record form data.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GeographicRecordSubmission {
    pub title: Option<String>,
    pub content_type: Option<String>,
    pub description: Option<String>,
    pub village: Option<i32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub captured_date: Option<NaiveDate>,
    pub file_path: Option<String>,
    pub thumbnail_path: Option<String>,
    pub youtube_url: Option<String>,
    #[serde(skip)]
    pub file: Option<UploadedFile>,
    #[serde(skip)]
    pub thumbnail: Option<UploadedFile>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedGeographicRecord {
    pub title: String,
    pub content_type: ContentType,
    pub description: String,
    pub village_id: i32,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub captured_date: NaiveDate,
    pub media: MediaSource,
    pub thumbnail: Option<MediaSource>,
}

impl GeographicRecordSubmission {
    /// Stricter than the table: the village must be chosen here even though
    /// the column is nullable.
    pub fn validate(self) -> Result<ValidatedGeographicRecord, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let title = clean(self.title);
        if title.is_none() {
            errors.add("title", MSG_REQUIRED);
        }
        let content_type = required_choice::<ContentType>(
            &mut errors,
            "content_type",
            self.content_type.as_deref(),
            "Select a content type.",
        );
        let description = clean(self.description);
        if description.is_none() {
            errors.add("description", MSG_REQUIRED);
        }
        if self.village.is_none() {
            errors.add("village", "Select a village.");
        }
        if self.captured_date.is_none() {
            errors.add("captured_date", MSG_REQUIRED);
        }
        let media = resolve_media(&mut errors, self.file, self.file_path, self.youtube_url);
        let thumbnail = resolve_thumbnail(&mut errors, self.thumbnail, self.thumbnail_path);

        match (
            title,
            content_type,
            description,
            self.village,
            self.captured_date,
            media,
        ) {
            (
                Some(title),
                Some(content_type),
                Some(description),
                Some(village_id),
                Some(captured_date),
                Some(media),
            ) if errors.is_empty() => Ok(ValidatedGeographicRecord {
                title,
                content_type,
                description,
                village_id,
                latitude: self.latitude,
                longitude: self.longitude,
                captured_date,
                media,
                thumbnail,
            }),
            _ => Err(errors),
        }
    }
}

/// Applies the file-xor-link rule. A fresh upload takes precedence over an
/// already stored `file_path`.
fn resolve_media(
    errors: &mut ValidationErrors,
    upload: Option<UploadedFile>,
    file_path: Option<String>,
    youtube_url: Option<String>,
) -> Option<MediaSource> {
    let stored = clean(file_path);
    let link = clean(youtube_url);

    check_url(errors, "youtube_url", link.as_deref());
    // an invalid stored path still counts as a file for the exclusivity rule
    check_url(errors, "file_path", stored.as_deref());

    let file = match (upload, stored) {
        (Some(upload), _) => Some(MediaSource::Upload(upload)),
        (None, Some(path)) => Some(MediaSource::Stored(path)),
        (None, None) => None,
    };

    match (file, link) {
        (None, None) => {
            errors.add_non_field(MSG_NEITHER_FILE_NOR_LINK);
            None
        }
        (Some(_), Some(_)) => {
            errors.add_non_field(MSG_BOTH_FILE_AND_LINK);
            None
        }
        (Some(file), None) => Some(file),
        (None, Some(url)) => Some(MediaSource::YouTube(url)),
    }
}

fn resolve_thumbnail(
    errors: &mut ValidationErrors,
    upload: Option<UploadedFile>,
    path: Option<String>,
) -> Option<MediaSource> {
    let path = clean(path);
    if upload.is_none() {
        check_url(errors, "thumbnail_path", path.as_deref());
    }
    match (upload, path) {
        (Some(upload), _) => Some(MediaSource::Upload(upload)),
        (None, Some(path)) => Some(MediaSource::Stored(path)),
        (None, None) => None,
    }
}

fn required_choice<T: FromStr>(
    errors: &mut ValidationErrors,
    field: &'static str,
    raw: Option<&str>,
    missing: &str,
) -> Option<T> {
    match non_blank(raw) {
        None => {
            errors.add(field, missing);
            None
        }
        Some(code) => parse_choice(errors, field, code),
    }
}

fn optional_choice<T: FromStr>(
    errors: &mut ValidationErrors,
    field: &'static str,
    raw: Option<&str>,
) -> Option<T> {
    non_blank(raw).and_then(|code| parse_choice(errors, field, code))
}

fn parse_choice<T: FromStr>(
    errors: &mut ValidationErrors,
    field: &'static str,
    code: &str,
) -> Option<T> {
    match code.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            errors.add(
                field,
                format!(
                    "Select a valid choice. {} is not one of the available choices.",
                    code.trim()
                ),
            );
            None
        }
    }
}

fn check_url(errors: &mut ValidationErrors, field: &'static str, value: Option<&str>) {
    if let Some(url) = value {
        if !is_web_url(url) {
            errors.add(field, MSG_INVALID_URL);
        }
    }
}

fn is_web_url(raw: &str) -> bool {
    match url::Url::parse(raw) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host().is_some(),
        Err(_) => false,
    }
}

/// Village name and coordinates.
pub fn validate_village(v: &NewVillage) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    required_text(&mut errors, "name", &v.name, MAX_VILLAGE_NAME);
    for (field, value) in [("latitude", v.latitude), ("longitude", v.longitude)] {
        if !value.is_finite() {
            errors.add(field, MSG_INVALID_NUMBER);
        }
    }
    errors.into_result()
}

pub fn validate_speaker(s: &NewSpeaker) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    required_text(&mut errors, "speaker_id", &s.speaker_id, MAX_SPEAKER_ID);
    errors.into_result()
}

/// Code, name and description are all required.
pub fn validate_onomatopoeia_type(t: &NewOnomatopoeiaType) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    required_text(&mut errors, "type_code", &t.type_code, MAX_TYPE_CODE);
    required_text(&mut errors, "type_name", &t.type_name, MAX_TYPE_NAME);
    if t.description.trim().is_empty() {
        errors.add("description", MSG_REQUIRED);
    }
    errors.into_result()
}

/// Non-blank after trimming and at most `max` characters.
fn required_text(errors: &mut ValidationErrors, field: &'static str, value: &str, max: usize) {
    let value = value.trim();
    let len = value.chars().count();
    if value.is_empty() {
        errors.add(field, MSG_REQUIRED);
    } else if len > max {
        errors.add(
            field,
            format!(
                "Ensure this value has at most {} characters (it has {}).",
                max, len
            ),
        );
    }
}

/// Trims the value; blank becomes `None`.
pub fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
