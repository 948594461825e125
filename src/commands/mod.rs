pub mod app_command;
pub mod catalog;
pub mod records;

pub use app_command::{AppCommand, ListArgs, RecordKind};

use crate::admin::FormView;
use crate::config::AppConfig;
use crate::error::ArchiveError;
use crate::records::ArchiveService;
use crate::storage::repository::{NewOnomatopoeiaType, NewSpeaker, NewVillage, Page};
use anyhow::bail;
use std::fmt::Display;
use std::str::FromStr;

/// Runs one command to completion and returns the lines to print.
pub async fn execute(
    cmd: AppCommand,
    svc: &ArchiveService,
    config: &AppConfig,
) -> anyhow::Result<Vec<String>> {
    let per_page = config.page_size;
    match cmd {
        AppCommand::Villages(args) => catalog::list_villages(svc, &args, per_page).await,
        AppCommand::VillageAdd {
            name,
            latitude,
            longitude,
            description,
        } => {
            let v = NewVillage {
                name,
                latitude,
                longitude,
                description: description.unwrap_or_default(),
            };
            catalog::add_village(svc, v).await
        }
        AppCommand::VillageEdit {
            id,
            name,
            latitude,
            longitude,
            description,
        } => catalog::edit_village(svc, id, name, latitude, longitude, description).await,
        AppCommand::VillageDelete { id } => catalog::delete_village(svc, id).await,
        AppCommand::Speakers(args) => catalog::list_speakers(svc, &args, per_page).await,
        AppCommand::SpeakerAdd {
            speaker_id,
            age_range,
            gender,
            village_id,
            consent_video,
            notes,
        } => {
            let s = NewSpeaker {
                speaker_id,
                age_range,
                gender,
                village_id,
                consent_video,
                notes: notes.unwrap_or_default(),
            };
            catalog::add_speaker(svc, s).await
        }
        AppCommand::SpeakerEdit {
            id,
            speaker_id,
            age_range,
            gender,
            village_id,
            consent_video,
            notes,
        } => {
            let s = NewSpeaker {
                speaker_id,
                age_range,
                gender,
                village_id,
                consent_video,
                notes: String::new(),
            };
            catalog::edit_speaker(svc, id, s, notes).await
        }
        AppCommand::SpeakerDelete { id } => catalog::delete_speaker(svc, id).await,
        AppCommand::Types(args) => catalog::list_types(svc, &args, per_page).await,
        AppCommand::TypeAdd {
            type_code,
            type_name,
            description,
        } => {
            let t = NewOnomatopoeiaType {
                type_code,
                type_name,
                description: description.unwrap_or_default(),
            };
            catalog::add_type(svc, t).await
        }
        AppCommand::TypeEdit {
            id,
            type_code,
            type_name,
            description,
        } => catalog::edit_type(svc, id, type_code, type_name, description).await,
        AppCommand::TypeDelete { id } => catalog::delete_type(svc, id).await,
        AppCommand::Records(kind, args) => records::list(svc, kind, &args, per_page).await,
        AppCommand::RecordShow { kind, id } => records::show(svc, kind, id).await,
        AppCommand::RecordSubmit {
            kind,
            form,
            media,
            thumbnail,
        } => records::submit(svc, kind, None, &form, media.as_deref(), thumbnail.as_deref()).await,
        AppCommand::RecordEdit {
            kind,
            id,
            form,
            media,
            thumbnail,
        } => {
            records::submit(
                svc,
                kind,
                Some(id),
                &form,
                media.as_deref(),
                thumbnail.as_deref(),
            )
            .await
        }
        AppCommand::RecordDelete { kind, id } => records::delete(svc, kind, id).await,
        AppCommand::Form { is_new } => Ok(render_form(FormView::for_record(is_new))),
        AppCommand::Help => Ok(app_command::USAGE.iter().map(|s| s.to_string()).collect()),
        AppCommand::Quit => Ok(Vec::new()),
        AppCommand::Unknown(msg) if msg.is_empty() => Ok(Vec::new()),
        AppCommand::Unknown(msg) => Ok(vec![msg]),
    }
}

/// Turns a failed command into lines for the submitter. Validation errors
/// get one line per problem.
pub fn describe_error(err: &anyhow::Error) -> Vec<String> {
    match err.downcast_ref::<ArchiveError>() {
        Some(ArchiveError::Validation(errors)) => {
            let mut lines = vec!["✗ submission rejected:".to_string()];
            lines.extend(errors.iter().map(|e| match e.field {
                Some(field) => format!("  {}: {}", field, e.message),
                None => format!("  {}", e.message),
            }));
            lines
        }
        Some(e) => vec![format!("✗ {}", e)],
        None => vec![format!("✗ {:#}", err)],
    }
}

fn render_form(view: FormView) -> Vec<String> {
    let mut lines = vec![format!("language record form ({:?} view)", view)];
    for fs in view.language_record_fieldsets() {
        lines.push(format!("[{}] {}", fs.name, fs.fields.join(", ")));
    }
    let readonly = view.language_record_readonly();
    if !readonly.is_empty() {
        lines.push(format!("read-only: {}", readonly.join(", ")));
    }
    lines
}

pub(crate) fn page_header<T>(title: &str, page: &Page<T>, columns: &[&str]) -> Vec<String> {
    vec![
        format!(
            "{}: page {}/{} ({} total)",
            title,
            page.page + 1,
            page.num_pages().max(1),
            page.total
        ),
        format!("id | {}", columns.join(" | ")),
    ]
}

/// Parses an optional `key=value` list option.
pub(crate) fn parse_option<T>(args: &ListArgs, key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    match args.option(key) {
        None => Ok(None),
        Some(raw) => match raw.parse::<T>() {
            Ok(v) => Ok(Some(v)),
            Err(e) => bail!("invalid {}={}: {}", key, raw, e),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::validation::ValidationErrors;

    #[test]
    fn validation_errors_are_listed_per_field() {
        let mut errors = ValidationErrors::default();
        errors.add("meaning", "Enter the meaning.");
        let err = anyhow::Error::from(ArchiveError::Validation(errors));
        assert_eq!(
            describe_error(&err),
            vec![
                "✗ submission rejected:".to_string(),
                "  meaning: Enter the meaning.".to_string()
            ]
        );
    }

    #[test]
    fn form_view_lines() {
        let lines = render_form(FormView::Change);
        assert!(lines.iter().any(|l| l.contains("village")));
        assert!(lines.last().unwrap().starts_with("read-only"));
        let lines = render_form(FormView::Add);
        assert!(!lines.iter().any(|l| l.contains("village")));
    }

    #[test]
    fn parse_option_reports_bad_values() {
        let args: ListArgs = match "records village=abc".parse::<AppCommand>() {
            Ok(AppCommand::Records(_, args)) => args,
            _ => panic!("expected records command"),
        };
        assert!(parse_option::<i32>(&args, "village").is_err());
        assert_eq!(parse_option::<i32>(&args, "page").unwrap(), None);
    }
}
