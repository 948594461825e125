use super::{page_header, parse_option, ListArgs, RecordKind};
use crate::admin::{video_publicly_viewable, GEOGRAPHIC_RECORD_COLUMNS, LANGUAGE_RECORD_COLUMNS};
use crate::error::ArchiveError;
use crate::media::UploadedFile;
use crate::records::{ArchiveService, GeographicRecordSubmission, LanguageRecordSubmission};
use crate::storage::entity::geographic_record::ContentType;
use crate::storage::entity::language_record::{FileType, LanguageFrequency};
use crate::storage::repository::{
    GeographicRecordFilter, GeographicRecordRepository, LanguageRecordFilter,
    LanguageRecordRepository, OnomatopoeiaTypeRepository, SpeakerRepository, VillageRepository,
};
use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveEnum, DatabaseConnection};
use std::collections::HashMap;
use std::path::Path;

pub async fn list(
    svc: &ArchiveService,
    kind: RecordKind,
    args: &ListArgs,
    per_page: u64,
) -> anyhow::Result<Vec<String>> {
    match kind {
        RecordKind::Language => list_language(svc, args, per_page).await,
        RecordKind::Geographic => list_geographic(svc, args, per_page).await,
    }
}

async fn list_language(
    svc: &ArchiveService,
    args: &ListArgs,
    per_page: u64,
) -> anyhow::Result<Vec<String>> {
    let filter = LanguageRecordFilter {
        search: args.search.clone(),
        file_type: parse_option::<FileType>(args, "file_type")?,
        speaker_village_id: parse_option::<i32>(args, "village")?,
        recorded_from: parse_option::<NaiveDate>(args, "from")?,
        recorded_to: parse_option::<NaiveDate>(args, "to")?,
        onomatopoeia_type_id: parse_option::<i32>(args, "type")?,
        language_frequency: parse_option::<LanguageFrequency>(args, "freq")?,
    };
    let page = LanguageRecordRepository::list(svc.db(), &filter, args.page, per_page).await?;

    let village_ids: Vec<i32> = page.items.iter().filter_map(|r| r.village_id).collect();
    let villages = village_names(svc.db(), &village_ids).await?;
    let speaker_ids: Vec<i32> = page.items.iter().filter_map(|r| r.speaker_id).collect();
    let speakers: HashMap<i32, String> = SpeakerRepository::find_many(svc.db(), &speaker_ids)
        .await?
        .into_iter()
        .map(|s| (s.id, s.speaker_id))
        .collect();

    let mut lines = page_header("language records", &page, LANGUAGE_RECORD_COLUMNS);
    for r in &page.items {
        lines.push(format!(
            "{} | {} | {} | {} | {} | {} | {}",
            r.id,
            r.display_title(),
            r.file_type.to_value(),
            label(&villages, r.village_id),
            label(&speakers, r.speaker_id),
            r.language_frequency
                .map(|f| f.to_value())
                .unwrap_or_else(|| "-".to_string()),
            r.recorded_date
        ));
    }
    Ok(lines)
}

async fn list_geographic(
    svc: &ArchiveService,
    args: &ListArgs,
    per_page: u64,
) -> anyhow::Result<Vec<String>> {
    let filter = GeographicRecordFilter {
        search: args.search.clone(),
        content_type: parse_option::<ContentType>(args, "content")?,
        village_id: parse_option::<i32>(args, "village")?,
        captured_from: parse_option::<NaiveDate>(args, "from")?,
        captured_to: parse_option::<NaiveDate>(args, "to")?,
    };
    let page = GeographicRecordRepository::list(svc.db(), &filter, args.page, per_page).await?;

    let village_ids: Vec<i32> = page.items.iter().filter_map(|r| r.village_id).collect();
    let villages = village_names(svc.db(), &village_ids).await?;

    let mut lines = page_header("geographic records", &page, GEOGRAPHIC_RECORD_COLUMNS);
    for r in &page.items {
        lines.push(format!(
            "{} | {} | {} | {} | {}",
            r.id,
            r.display_title(),
            r.content_type.to_value(),
            label(&villages, r.village_id),
            r.captured_date
        ));
    }
    Ok(lines)
}

pub async fn show(svc: &ArchiveService, kind: RecordKind, id: i32) -> anyhow::Result<Vec<String>> {
    match kind {
        RecordKind::Language => show_language(svc, id).await,
        RecordKind::Geographic => show_geographic(svc, id).await,
    }
}

async fn show_language(svc: &ArchiveService, id: i32) -> anyhow::Result<Vec<String>> {
    let db = svc.db();
    let Some(r) = LanguageRecordRepository::find(db, id).await? else {
        return Err(ArchiveError::NotFound {
            entity: "language record",
            id,
        }
        .into());
    };
    let speaker = match r.speaker_id {
        Some(sid) => SpeakerRepository::find(db, sid).await?,
        None => None,
    };
    let village = match r.village_id {
        Some(vid) => VillageRepository::find(db, vid).await?,
        None => None,
    };
    let kind = match r.onomatopoeia_type_id {
        Some(tid) => OnomatopoeiaTypeRepository::find(db, tid).await?,
        None => None,
    };

    let mut lines = vec![
        format!("language record #{}: {}", r.id, r.display_title()),
        format!("  file_type:     {}", r.file_type.to_value()),
        format!("  onomatopoeia:  {}", opt(&r.onomatopoeia_text)),
        format!("  meaning:       {}", opt(&r.meaning)),
        format!("  usage:         {}", opt(&r.usage_example)),
        format!("  phonetic:      {}", opt(&r.phonetic_notation)),
        format!(
            "  frequency:     {}",
            r.language_frequency
                .map(|f| f.to_value())
                .unwrap_or_else(|| "-".to_string())
        ),
        format!(
            "  type:          {}",
            kind.map(|t| t.to_string()).unwrap_or_else(|| "-".to_string())
        ),
        format!(
            "  speaker:       {}",
            speaker
                .as_ref()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".to_string())
        ),
        format!(
            "  village:       {}",
            village.map(|v| v.name).unwrap_or_else(|| "-".to_string())
        ),
        format!("  recorded:      {}", r.recorded_date),
        format!("  file:          {}", opt(&r.file_path)),
        format!("  thumbnail:     {}", opt(&r.thumbnail_path)),
        format!("  youtube:       {}", opt(&r.youtube_url)),
        format!(
            "  embed:         {}",
            r.youtube_embed_url().unwrap_or_else(|| "-".to_string())
        ),
        format!("  created:       {}", timestamp(r.created_at)),
        format!("  updated:       {}", timestamp(r.updated_at)),
    ];
    if !video_publicly_viewable(&r, speaker.as_ref()) {
        lines.push("  ! speaker has not consented to public video".to_string());
    }
    Ok(lines)
}

async fn show_geographic(svc: &ArchiveService, id: i32) -> anyhow::Result<Vec<String>> {
    let db = svc.db();
    let Some(r) = GeographicRecordRepository::find(db, id).await? else {
        return Err(ArchiveError::NotFound {
            entity: "geographic record",
            id,
        }
        .into());
    };
    let village = match r.village_id {
        Some(vid) => VillageRepository::find(db, vid).await?,
        None => None,
    };
    let position = match (r.latitude, r.longitude) {
        (Some(lat), Some(lon)) => format!("{:.5}, {:.5}", lat, lon),
        _ => "-".to_string(),
    };

    Ok(vec![
        format!("geographic record #{}: {}", r.id, r.display_title()),
        format!("  content_type:  {}", r.content_type.to_value()),
        format!("  description:   {}", r.description),
        format!(
            "  village:       {}",
            village.map(|v| v.name).unwrap_or_else(|| "-".to_string())
        ),
        format!("  position:      {}", position),
        format!("  captured:      {}", r.captured_date),
        format!("  file:          {}", opt(&r.file_path)),
        format!("  thumbnail:     {}", opt(&r.thumbnail_path)),
        format!("  youtube:       {}", opt(&r.youtube_url)),
        format!(
            "  embed:         {}",
            r.youtube_embed_url().unwrap_or_else(|| "-".to_string())
        ),
        format!("  created:       {}", timestamp(r.created_at)),
    ])
}

/// Creates (`id` is None) or edits a record from a JSON form file, with an
/// optional media file and thumbnail read from disk.
pub async fn submit(
    svc: &ArchiveService,
    kind: RecordKind,
    id: Option<i32>,
    form: &Path,
    media: Option<&Path>,
    thumbnail: Option<&Path>,
) -> anyhow::Result<Vec<String>> {
    let raw = tokio::fs::read_to_string(form)
        .await
        .with_context(|| format!("reading form {}", form.display()))?;
    let file = read_upload(media).await?;
    let thumbnail = read_upload(thumbnail).await?;

    match kind {
        RecordKind::Language => {
            let mut submission: LanguageRecordSubmission = serde_json::from_str(&raw)
                .with_context(|| format!("parsing form {}", form.display()))?;
            submission.file = file;
            submission.thumbnail = thumbnail;
            let (verb, r) = match id {
                None => ("created", svc.submit_language_record(submission).await?),
                Some(id) => ("updated", svc.edit_language_record(id, submission).await?),
            };
            Ok(vec![format!(
                "✓ language record #{} {}: {}",
                r.id,
                verb,
                r.display_title()
            )])
        }
        RecordKind::Geographic => {
            let mut submission: GeographicRecordSubmission = serde_json::from_str(&raw)
                .with_context(|| format!("parsing form {}", form.display()))?;
            submission.file = file;
            submission.thumbnail = thumbnail;
            let (verb, r) = match id {
                None => ("created", svc.submit_geographic_record(submission).await?),
                Some(id) => ("updated", svc.edit_geographic_record(id, submission).await?),
            };
            Ok(vec![format!(
                "✓ geographic record #{} {}: {}",
                r.id,
                verb,
                r.display_title()
            )])
        }
    }
}

pub async fn delete(
    svc: &ArchiveService,
    kind: RecordKind,
    id: i32,
) -> anyhow::Result<Vec<String>> {
    match kind {
        RecordKind::Language => svc.delete_language_record(id).await?,
        RecordKind::Geographic => svc.delete_geographic_record(id).await?,
    }
    Ok(vec![format!("✓ record #{} deleted", id)])
}

async fn read_upload(path: Option<&Path>) -> anyhow::Result<Option<UploadedFile>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading media {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    Ok(Some(UploadedFile::new(name, bytes)))
}

async fn village_names(
    db: &DatabaseConnection,
    ids: &[i32],
) -> anyhow::Result<HashMap<i32, String>> {
    Ok(VillageRepository::find_many(db, ids)
        .await?
        .into_iter()
        .map(|v| (v.id, v.name))
        .collect())
}

fn label(names: &HashMap<i32, String>, id: Option<i32>) -> &str {
    id.and_then(|id| names.get(&id))
        .map(String::as_str)
        .unwrap_or("-")
}

fn opt(value: &Option<String>) -> &str {
    value.as_deref().filter(|v| !v.is_empty()).unwrap_or("-")
}

fn timestamp(secs: i64) -> String {
    DateTime::<Utc>::from_timestamp(secs, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| secs.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::AppCommand;
    use crate::media::LocalMediaStorage;
    use crate::storage::establish_connection;
    use crate::storage::repository::{NewOnomatopoeiaType, NewSpeaker, NewVillage};
    use crate::storage::entity::speaker::{AgeRange, Gender};
    use std::sync::Arc;

    async fn setup(dir: &Path) -> ArchiveService {
        let db = establish_connection("sqlite::memory:").await.unwrap();
        let media =
            LocalMediaStorage::new(dir.join("media"), "http://localhost:8000/media/").unwrap();
        ArchiveService::new(Arc::new(db), Arc::new(media))
    }

    fn list_args(line: &str) -> (RecordKind, ListArgs) {
        match line.parse::<AppCommand>() {
            Ok(AppCommand::Records(kind, args)) => (kind, args),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn submit_from_form_file_then_list_and_show() {
        let dir = tempfile::tempdir().unwrap();
        let svc = setup(dir.path()).await;
        let v = svc
            .create_village(NewVillage {
                name: "Ogimi".to_string(),
                latitude: 26.7,
                longitude: 128.1,
                description: String::new(),
            })
            .await
            .unwrap();
        let s = svc
            .create_speaker(NewSpeaker {
                speaker_id: "SPK001".to_string(),
                age_range: AgeRange::Eighties,
                gender: Gender::Female,
                village_id: Some(v.id),
                consent_video: false,
                notes: String::new(),
            })
            .await
            .unwrap();

        let form = dir.path().join("form.json");
        let json = format!(
            r#"{{"file_type": "video", "speaker": {}, "recorded_date": "2024-03-01",
                "youtube_url": "https://www.youtube.com/watch?v=abc123", "title": "Harvest song"}}"#,
            s.id
        );
        tokio::fs::write(&form, json).await.unwrap();

        let out = submit(&svc, RecordKind::Language, None, &form, None, None)
            .await
            .unwrap();
        assert!(out[0].contains("Harvest song"), "{:?}", out);

        let (kind, args) = list_args(&format!("records village={}", v.id));
        let lines = list(&svc, kind, &args, 20).await.unwrap();
        assert_eq!(lines.len(), 3);
        assert!(lines[2].contains("Ogimi"));
        assert!(lines[2].contains("SPK001"));

        let (kind, args) = list_args("records file_type=audio");
        let lines = list(&svc, kind, &args, 20).await.unwrap();
        assert_eq!(lines.len(), 2);

        let detail = show(&svc, RecordKind::Language, 1).await.unwrap();
        assert!(detail
            .iter()
            .any(|l| l.contains("https://www.youtube.com/embed/abc123")));
        assert!(detail.iter().any(|l| l.contains("not consented")));
    }

    #[tokio::test]
    async fn geographic_upload_is_stored_under_media_root() {
        let dir = tempfile::tempdir().unwrap();
        let svc = setup(dir.path()).await;
        let v = svc
            .create_village(NewVillage {
                name: "Kunigami".to_string(),
                latitude: 26.7,
                longitude: 128.2,
                description: String::new(),
            })
            .await
            .unwrap();

        let form = dir.path().join("geo.json");
        let json = format!(
            r#"{{"title": "Coastline", "content_type": "drone_photo", "description": "Reef at low tide",
                "village": {}, "captured_date": "2023-11-20"}}"#,
            v.id
        );
        tokio::fs::write(&form, json).await.unwrap();
        let photo = dir.path().join("reef.JPG");
        tokio::fs::write(&photo, b"jpeg").await.unwrap();

        submit(&svc, RecordKind::Geographic, None, &form, Some(&photo), None)
            .await
            .unwrap();
        let detail = show(&svc, RecordKind::Geographic, 1).await.unwrap();
        let file_line = detail.iter().find(|l| l.contains("file:")).unwrap();
        assert!(file_line.contains("http://localhost:8000/media/"));
        assert!(file_line.ends_with(".jpg"));
        assert!(detail.iter().any(|l| l.contains("Kunigami")));
    }

    #[tokio::test]
    async fn missing_record_and_bad_form_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        let svc = setup(dir.path()).await;
        assert!(show(&svc, RecordKind::Language, 9).await.is_err());
        assert!(delete(&svc, RecordKind::Geographic, 9).await.is_err());

        let form = dir.path().join("broken.json");
        tokio::fs::write(&form, "{ not json").await.unwrap();
        let err = submit(&svc, RecordKind::Language, None, &form, None, None)
            .await
            .unwrap_err();
        assert!(format!("{:#}", err).contains("parsing form"));
    }

    #[tokio::test]
    async fn records_filter_by_onomatopoeia_type() {
        let dir = tempfile::tempdir().unwrap();
        let svc = setup(dir.path()).await;
        let s = svc
            .create_speaker(NewSpeaker {
                speaker_id: "SPK010".to_string(),
                age_range: AgeRange::Seventies,
                gender: Gender::Male,
                village_id: None,
                consent_video: true,
                notes: String::new(),
            })
            .await
            .unwrap();
        let t = svc
            .create_type(NewOnomatopoeiaType {
                type_code: "GIS".to_string(),
                type_name: "Giseigo".to_string(),
                description: "Imitates sounds".to_string(),
            })
            .await
            .unwrap();

        for (name, typed) in [("typed.json", true), ("plain.json", false)] {
            let form = dir.path().join(name);
            let type_field = if typed {
                format!(r#", "onomatopoeia_type": {}"#, t.id)
            } else {
                String::new()
            };
            let json = format!(
                r#"{{"file_type": "audio", "speaker": {}, "recorded_date": "2024-05-02",
                    "youtube_url": "https://youtu.be/xyz789", "title": "{}"{}}}"#,
                s.id, name, type_field
            );
            tokio::fs::write(&form, json).await.unwrap();
            submit(&svc, RecordKind::Language, None, &form, None, None)
                .await
                .unwrap();
        }

        let (kind, args) = list_args(&format!("records type={}", t.id));
        let lines = list(&svc, kind, &args, 20).await.unwrap();
        assert_eq!(lines.len(), 3, "{:?}", lines);
        assert!(lines[2].contains("typed.json"));

        let (kind, args) = list_args("records type=abc");
        assert!(list(&svc, kind, &args, 20).await.is_err());
    }
}
