use super::app_command::is_truthy;
use super::{page_header, parse_option, ListArgs};
use crate::admin::{ONOMATOPOEIA_TYPE_COLUMNS, SPEAKER_COLUMNS, VILLAGE_COLUMNS};
use crate::error::ArchiveError;
use crate::records::ArchiveService;
use crate::storage::entity::speaker::Gender;
use crate::storage::repository::{
    NewOnomatopoeiaType, NewSpeaker, NewVillage, OnomatopoeiaTypeRepository, SpeakerFilter,
    SpeakerRepository, VillageRepository,
};
use sea_orm::ActiveEnum;
use std::collections::HashMap;

pub async fn list_villages(
    svc: &ArchiveService,
    args: &ListArgs,
    per_page: u64,
) -> anyhow::Result<Vec<String>> {
    let page = VillageRepository::list(svc.db(), args.search.as_deref(), args.page, per_page).await?;
    let mut lines = page_header("villages", &page, VILLAGE_COLUMNS);
    lines.extend(page.items.iter().map(|v| {
        format!("{} | {} | {:.5} | {:.5}", v.id, v.name, v.latitude, v.longitude)
    }));
    Ok(lines)
}

pub async fn add_village(svc: &ArchiveService, v: NewVillage) -> anyhow::Result<Vec<String>> {
    let v = svc.create_village(v).await?;
    Ok(vec![format!("✓ village #{} {} created", v.id, v.name)])
}

/// Replaces name and position. `description: None` keeps the stored one.
pub async fn edit_village(
    svc: &ArchiveService,
    id: i32,
    name: String,
    latitude: f64,
    longitude: f64,
    description: Option<String>,
) -> anyhow::Result<Vec<String>> {
    let description = match description {
        Some(text) => text,
        None => match VillageRepository::find(svc.db(), id).await? {
            Some(existing) => existing.description,
            None => {
                return Err(ArchiveError::NotFound {
                    entity: "village",
                    id,
                }
                .into())
            }
        },
    };
    let v = svc
        .update_village(
            id,
            NewVillage {
                name,
                latitude,
                longitude,
                description,
            },
        )
        .await?;
    Ok(vec![format!("✓ village #{} {} updated", v.id, v.name)])
}

pub async fn delete_village(svc: &ArchiveService, id: i32) -> anyhow::Result<Vec<String>> {
    svc.delete_village(id).await?;
    Ok(vec![format!(
        "✓ village #{} deleted; speakers and records keep existing without a village",
        id
    )])
}

pub async fn list_speakers(
    svc: &ArchiveService,
    args: &ListArgs,
    per_page: u64,
) -> anyhow::Result<Vec<String>> {
    let filter = SpeakerFilter {
        search: args.search.clone(),
        gender: parse_option::<Gender>(args, "gender")?,
        consent_video: args.option("consent").map(is_truthy),
        village_id: parse_option::<i32>(args, "village")?,
    };
    let page = SpeakerRepository::list(svc.db(), &filter, args.page, per_page).await?;

    let village_ids: Vec<i32> = page.items.iter().filter_map(|s| s.village_id).collect();
    let villages: HashMap<i32, String> = VillageRepository::find_many(svc.db(), &village_ids)
        .await?
        .into_iter()
        .map(|v| (v.id, v.name))
        .collect();

    let mut lines = page_header("speakers", &page, SPEAKER_COLUMNS);
    lines.extend(page.items.iter().map(|s| {
        let village = s
            .village_id
            .and_then(|id| villages.get(&id))
            .map(String::as_str)
            .unwrap_or("-");
        format!(
            "{} | {} | {} | {} | {} | {}",
            s.id,
            s.speaker_id,
            s.age_range.to_value(),
            s.gender.label(),
            village,
            if s.consent_video { "yes" } else { "no" }
        )
    }));
    Ok(lines)
}

pub async fn add_speaker(svc: &ArchiveService, s: NewSpeaker) -> anyhow::Result<Vec<String>> {
    let s = svc.create_speaker(s).await?;
    Ok(vec![format!("✓ speaker #{} {} created", s.id, s)])
}

/// `notes: None` keeps the stored notes; otherwise they replace `s.notes`.
pub async fn edit_speaker(
    svc: &ArchiveService,
    id: i32,
    mut s: NewSpeaker,
    notes: Option<String>,
) -> anyhow::Result<Vec<String>> {
    s.notes = match notes {
        Some(text) => text,
        None => match SpeakerRepository::find(svc.db(), id).await? {
            Some(existing) => existing.notes,
            None => {
                return Err(ArchiveError::NotFound {
                    entity: "speaker",
                    id,
                }
                .into())
            }
        },
    };
    let updated = svc.update_speaker(id, s).await?;
    Ok(vec![format!("✓ speaker #{} {} updated", updated.id, updated)])
}

pub async fn delete_speaker(svc: &ArchiveService, id: i32) -> anyhow::Result<Vec<String>> {
    svc.delete_speaker(id).await?;
    Ok(vec![format!("✓ speaker #{} deleted", id)])
}

pub async fn list_types(
    svc: &ArchiveService,
    args: &ListArgs,
    per_page: u64,
) -> anyhow::Result<Vec<String>> {
    let page =
        OnomatopoeiaTypeRepository::list(svc.db(), args.search.as_deref(), args.page, per_page)
            .await?;
    let mut lines = page_header("onomatopoeia types", &page, ONOMATOPOEIA_TYPE_COLUMNS);
    lines.extend(
        page.items
            .iter()
            .map(|t| format!("{} | {} | {}", t.id, t.type_code, t.type_name)),
    );
    Ok(lines)
}

pub async fn add_type(svc: &ArchiveService, t: NewOnomatopoeiaType) -> anyhow::Result<Vec<String>> {
    let t = svc.create_type(t).await?;
    Ok(vec![format!("✓ type #{} {} created", t.id, t)])
}

/// `description: None` keeps the stored description.
pub async fn edit_type(
    svc: &ArchiveService,
    id: i32,
    type_code: String,
    type_name: String,
    description: Option<String>,
) -> anyhow::Result<Vec<String>> {
    let description = match description {
        Some(text) => text,
        None => match OnomatopoeiaTypeRepository::find(svc.db(), id).await? {
            Some(existing) => existing.description,
            None => {
                return Err(ArchiveError::NotFound {
                    entity: "onomatopoeia type",
                    id,
                }
                .into())
            }
        },
    };
    let t = svc
        .update_type(
            id,
            NewOnomatopoeiaType {
                type_code,
                type_name,
                description,
            },
        )
        .await?;
    Ok(vec![format!("✓ type #{} {} updated", t.id, t)])
}

pub async fn delete_type(svc: &ArchiveService, id: i32) -> anyhow::Result<Vec<String>> {
    svc.delete_type(id).await?;
    Ok(vec![format!(
        "✓ type #{} deleted; its records are now unclassified",
        id
    )])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{execute, AppCommand};
    use crate::config::AppConfig;
    use crate::media::LocalMediaStorage;
    use crate::storage::establish_connection;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    async fn setup(dir: &Path) -> ArchiveService {
        let db = establish_connection("sqlite::memory:").await.unwrap();
        let media =
            LocalMediaStorage::new(dir.join("media"), "http://localhost:8000/media/").unwrap();
        ArchiveService::new(Arc::new(db), Arc::new(media))
    }

    async fn run(svc: &ArchiveService, line: &str) -> anyhow::Result<Vec<String>> {
        let cmd = line.parse::<AppCommand>().unwrap();
        let config = AppConfig {
            database_url: "sqlite::memory:".to_string(),
            media_root: svc_root(),
            media_base_url: "http://localhost:8000/media/".to_string(),
            log_dir: svc_root(),
            page_size: 20,
        };
        execute(cmd, svc, &config).await
    }

    fn svc_root() -> PathBuf {
        std::env::temp_dir()
    }

    #[tokio::test]
    async fn village_description_is_set_kept_and_cleared() {
        let dir = tempfile::tempdir().unwrap();
        let svc = setup(dir.path()).await;

        run(&svc, "village add 26.7 128.1 Ogimi -- Long-lived northern village")
            .await
            .unwrap();
        let v = VillageRepository::find(svc.db(), 1).await.unwrap().unwrap();
        assert_eq!(v.description, "Long-lived northern village");

        run(&svc, "village edit 1 26.7 128.1 Oogimi").await.unwrap();
        let v = VillageRepository::find(svc.db(), 1).await.unwrap().unwrap();
        assert_eq!(v.name, "Oogimi");
        assert_eq!(v.description, "Long-lived northern village");

        run(&svc, "village edit 1 26.7 128.1 Oogimi --").await.unwrap();
        let v = VillageRepository::find(svc.db(), 1).await.unwrap().unwrap();
        assert_eq!(v.description, "");

        assert!(run(&svc, "village edit 9 1 1 Nowhere").await.is_err());
    }

    #[tokio::test]
    async fn speaker_notes_are_set_and_kept_on_edit() {
        let dir = tempfile::tempdir().unwrap();
        let svc = setup(dir.path()).await;

        run(&svc, "speaker add SPK001 80-89 F consent=yes -- Sings work songs")
            .await
            .unwrap();
        let s = SpeakerRepository::find(svc.db(), 1).await.unwrap().unwrap();
        assert_eq!(s.notes, "Sings work songs");
        assert!(s.consent_video);

        run(&svc, "speaker edit 1 SPK001 90-99 F consent=no").await.unwrap();
        let s = SpeakerRepository::find(svc.db(), 1).await.unwrap().unwrap();
        assert_eq!(s.notes, "Sings work songs");
        assert!(!s.consent_video);

        run(&svc, "speaker edit 1 SPK001 90-99 F -- Moved away")
            .await
            .unwrap();
        let s = SpeakerRepository::find(svc.db(), 1).await.unwrap().unwrap();
        assert_eq!(s.notes, "Moved away");
    }

    #[tokio::test]
    async fn type_add_requires_description_and_edit_updates_fields() {
        let dir = tempfile::tempdir().unwrap();
        let svc = setup(dir.path()).await;

        let err = run(&svc, "type add GIS Giseigo").await.unwrap_err();
        let errors = err.downcast_ref::<ArchiveError>();
        assert!(
            matches!(errors, Some(ArchiveError::Validation(e)) if e.for_field("description").is_some()),
            "{:?}",
            err
        );

        run(&svc, "type add GIS Giseigo -- Imitates sounds").await.unwrap();
        let t = OnomatopoeiaTypeRepository::find(svc.db(), 1)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(t.description, "Imitates sounds");

        let out = run(&svc, "type edit 1 GIT Gitaigo").await.unwrap();
        assert!(out[0].contains("updated"), "{:?}", out);
        let t = OnomatopoeiaTypeRepository::find(svc.db(), 1)
            .await
            .unwrap()
            .unwrap();
        assert_eq!((t.type_code.as_str(), t.type_name.as_str()), ("GIT", "Gitaigo"));
        assert_eq!(t.description, "Imitates sounds");

        run(&svc, "type edit 1 GIT Gitaigo -- Depicts states").await.unwrap();
        let t = OnomatopoeiaTypeRepository::find(svc.db(), 1)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(t.description, "Depicts states");

        assert!(run(&svc, "type edit 1 GIT Gitaigo --").await.is_err());
        assert!(run(&svc, "type edit 7 X Y").await.is_err());
    }
}
