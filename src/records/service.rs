use crate::error::ArchiveError;
use crate::media::{MediaError, MediaStorage};
use crate::records::consistency::inherit_speaker_village;
use crate::records::validation::{
    validate_onomatopoeia_type, validate_speaker, validate_village, GeographicRecordSubmission,
    LanguageRecordSubmission, MediaSource, ValidatedGeographicRecord, ValidatedLanguageRecord,
    ValidationErrors,
};
use crate::storage::entity::{
    geographic_record, language_record, onomatopoeia_type, speaker, village,
};
use crate::storage::repository::{
    DeleteOutcome, GeographicRecordFields, GeographicRecordRepository, LanguageRecordFields,
    LanguageRecordRepository, NewOnomatopoeiaType, NewSpeaker, NewVillage,
    OnomatopoeiaTypeRepository, SpeakerRepository, VillageRepository,
};
use log::{info, warn};
use sea_orm::{DatabaseConnection, DbErr, SqlErr};
use std::sync::Arc;

const MSG_INVALID_REFERENCE: &str =
    "Select a valid choice. That choice is not one of the available choices.";

/// Administrative operations over the archive. Each call handles one
/// request to completion: validation and reference checks run before any
/// write, and a record is persisted with a single statement.
pub struct ArchiveService {
    db: Arc<DatabaseConnection>,
    media: Arc<dyn MediaStorage>,
}

impl ArchiveService {
    pub fn new(db: Arc<DatabaseConnection>, media: Arc<dyn MediaStorage>) -> Self {
        Self { db, media }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    // villages

    pub async fn create_village(&self, v: NewVillage) -> Result<village::Model, ArchiveError> {
        validate_village(&v)?;
        let created = VillageRepository::create(&self.db, v).await?;
        info!("created village #{} {}", created.id, created.name);
        Ok(created)
    }

    pub async fn update_village(
        &self,
        id: i32,
        v: NewVillage,
    ) -> Result<village::Model, ArchiveError> {
        validate_village(&v)?;
        VillageRepository::update(&self.db, id, v)
            .await?
            .ok_or(ArchiveError::NotFound {
                entity: "village",
                id,
            })
    }

    /// Speakers and records of the village survive with their village cleared.
    pub async fn delete_village(&self, id: i32) -> Result<(), ArchiveError> {
        if !VillageRepository::delete(&self.db, id).await? {
            return Err(ArchiveError::NotFound {
                entity: "village",
                id,
            });
        }
        Ok(())
    }

    // speakers

    pub async fn create_speaker(&self, s: NewSpeaker) -> Result<speaker::Model, ArchiveError> {
        validate_speaker(&s)?;
        self.check_village(s.village_id, "village").await?;
        let code = s.speaker_id.trim().to_string();
        let created = SpeakerRepository::create(&self.db, s)
            .await
            .map_err(|e| ArchiveError::from_write(e, "speaker_id", &code))?;
        info!("created speaker #{} {}", created.id, created.speaker_id);
        Ok(created)
    }

    pub async fn update_speaker(
        &self,
        id: i32,
        s: NewSpeaker,
    ) -> Result<speaker::Model, ArchiveError> {
        validate_speaker(&s)?;
        self.check_village(s.village_id, "village").await?;
        let code = s.speaker_id.trim().to_string();
        SpeakerRepository::update(&self.db, id, s)
            .await
            .map_err(|e| ArchiveError::from_write(e, "speaker_id", &code))?
            .ok_or(ArchiveError::NotFound {
                entity: "speaker",
                id,
            })
    }

    /// Rejected while any language record references the speaker.
    pub async fn delete_speaker(&self, id: i32) -> Result<(), ArchiveError> {
        let outcome = match SpeakerRepository::delete(&self.db, id).await {
            Ok(outcome) => outcome,
            // a record may have been attached between the count and the delete
            Err(e) if is_foreign_key_violation(&e) => DeleteOutcome::Protected {
                dependents: SpeakerRepository::count_language_records(&self.db, id).await?,
            },
            Err(e) => return Err(e.into()),
        };
        match outcome {
            DeleteOutcome::Deleted => Ok(()),
            DeleteOutcome::NotFound => Err(ArchiveError::NotFound {
                entity: "speaker",
                id,
            }),
            DeleteOutcome::Protected { dependents } => {
                warn!(
                    "refused to delete speaker #{}: {} language record(s) reference it",
                    id, dependents
                );
                Err(ArchiveError::Protected {
                    entity: "speaker",
                    id,
                    dependents,
                })
            }
        }
    }

    // onomatopoeia types

    pub async fn create_type(
        &self,
        t: NewOnomatopoeiaType,
    ) -> Result<onomatopoeia_type::Model, ArchiveError> {
        validate_onomatopoeia_type(&t)?;
        let code = t.type_code.trim().to_string();
        OnomatopoeiaTypeRepository::create(&self.db, t)
            .await
            .map_err(|e| ArchiveError::from_write(e, "type_code", &code))
    }

    pub async fn update_type(
        &self,
        id: i32,
        t: NewOnomatopoeiaType,
    ) -> Result<onomatopoeia_type::Model, ArchiveError> {
        validate_onomatopoeia_type(&t)?;
        let code = t.type_code.trim().to_string();
        OnomatopoeiaTypeRepository::update(&self.db, id, t)
            .await
            .map_err(|e| ArchiveError::from_write(e, "type_code", &code))?
            .ok_or(ArchiveError::NotFound {
                entity: "onomatopoeia type",
                id,
            })
    }

    pub async fn delete_type(&self, id: i32) -> Result<(), ArchiveError> {
        if !OnomatopoeiaTypeRepository::delete(&self.db, id).await? {
            return Err(ArchiveError::NotFound {
                entity: "onomatopoeia type",
                id,
            });
        }
        Ok(())
    }

    // language records

    pub async fn submit_language_record(
        &self,
        submission: LanguageRecordSubmission,
    ) -> Result<language_record::Model, ArchiveError> {
        let validated = submission.validate()?;
        let speaker = self.check_language_references(&validated).await?;

        let mut uploaded = Vec::new();
        let result = async {
            let mut fields = self.language_fields(validated, &mut uploaded).await?;
            inherit_speaker_village(&mut fields, Some(&speaker));
            Ok::<_, ArchiveError>(LanguageRecordRepository::insert(&self.db, fields).await?)
        }
        .await;

        let created = self.finish(result, &uploaded).await?;
        info!(
            "created language record #{} ({})",
            created.id,
            created.display_title()
        );
        Ok(created)
    }

    pub async fn edit_language_record(
        &self,
        id: i32,
        submission: LanguageRecordSubmission,
    ) -> Result<language_record::Model, ArchiveError> {
        if LanguageRecordRepository::find(&self.db, id).await?.is_none() {
            return Err(ArchiveError::NotFound {
                entity: "language record",
                id,
            });
        }
        let validated = submission.validate()?;
        let speaker = self.check_language_references(&validated).await?;

        let mut uploaded = Vec::new();
        let result = async {
            let mut fields = self.language_fields(validated, &mut uploaded).await?;
            inherit_speaker_village(&mut fields, Some(&speaker));
            LanguageRecordRepository::update(&self.db, id, fields)
                .await?
                .ok_or(ArchiveError::NotFound {
                    entity: "language record",
                    id,
                })
        }
        .await;

        self.finish(result, &uploaded).await
    }

    pub async fn delete_language_record(&self, id: i32) -> Result<(), ArchiveError> {
        if !LanguageRecordRepository::delete(&self.db, id).await? {
            return Err(ArchiveError::NotFound {
                entity: "language record",
                id,
            });
        }
        Ok(())
    }

    // geographic records

    pub async fn submit_geographic_record(
        &self,
        submission: GeographicRecordSubmission,
    ) -> Result<geographic_record::Model, ArchiveError> {
        let validated = submission.validate()?;
        self.check_village(Some(validated.village_id), "village")
            .await?;

        let mut uploaded = Vec::new();
        let result = async {
            let fields = self.geographic_fields(validated, &mut uploaded).await?;
            Ok::<_, ArchiveError>(GeographicRecordRepository::insert(&self.db, fields).await?)
        }
        .await;

        let created = self.finish(result, &uploaded).await?;
        info!("created geographic record #{} ({})", created.id, created.title);
        Ok(created)
    }

    pub async fn edit_geographic_record(
        &self,
        id: i32,
        submission: GeographicRecordSubmission,
    ) -> Result<geographic_record::Model, ArchiveError> {
        if GeographicRecordRepository::find(&self.db, id).await?.is_none() {
            return Err(ArchiveError::NotFound {
                entity: "geographic record",
                id,
            });
        }
        let validated = submission.validate()?;
        self.check_village(Some(validated.village_id), "village")
            .await?;

        let mut uploaded = Vec::new();
        let result = async {
            let fields = self.geographic_fields(validated, &mut uploaded).await?;
            GeographicRecordRepository::update(&self.db, id, fields)
                .await?
                .ok_or(ArchiveError::NotFound {
                    entity: "geographic record",
                    id,
                })
        }
        .await;

        self.finish(result, &uploaded).await
    }

    pub async fn delete_geographic_record(&self, id: i32) -> Result<(), ArchiveError> {
        if !GeographicRecordRepository::delete(&self.db, id).await? {
            return Err(ArchiveError::NotFound {
                entity: "geographic record",
                id,
            });
        }
        Ok(())
    }

    // helpers

    /// Every referenced row must exist; returns the speaker for the
    /// village propagation step.
    async fn check_language_references(
        &self,
        v: &ValidatedLanguageRecord,
    ) -> Result<speaker::Model, ArchiveError> {
        let mut errors = ValidationErrors::default();
        let speaker = SpeakerRepository::find(&self.db, v.speaker_id).await?;
        if speaker.is_none() {
            errors.add("speaker", MSG_INVALID_REFERENCE);
        }
        if let Some(type_id) = v.onomatopoeia_type_id {
            if OnomatopoeiaTypeRepository::find(&self.db, type_id)
                .await?
                .is_none()
            {
                errors.add("onomatopoeia_type", MSG_INVALID_REFERENCE);
            }
        }
        if let Some(village_id) = v.village_id {
            if VillageRepository::find(&self.db, village_id).await?.is_none() {
                errors.add("village", MSG_INVALID_REFERENCE);
            }
        }
        match speaker {
            Some(speaker) if errors.is_empty() => Ok(speaker),
            _ => Err(errors.into()),
        }
    }

    async fn check_village(
        &self,
        village_id: Option<i32>,
        field: &'static str,
    ) -> Result<(), ArchiveError> {
        let Some(id) = village_id else {
            return Ok(());
        };
        if VillageRepository::find(&self.db, id).await?.is_none() {
            let mut errors = ValidationErrors::default();
            errors.add(field, MSG_INVALID_REFERENCE);
            return Err(errors.into());
        }
        Ok(())
    }

    async fn language_fields(
        &self,
        v: ValidatedLanguageRecord,
        uploaded: &mut Vec<String>,
    ) -> Result<LanguageRecordFields, ArchiveError> {
        let (file_path, youtube_url) = self.resolve_media(v.media, uploaded).await?;
        let thumbnail_path = match v.thumbnail {
            Some(thumb) => self.resolve_media(thumb, uploaded).await?.0,
            None => None,
        };
        Ok(LanguageRecordFields {
            onomatopoeia_text: v.onomatopoeia_text,
            meaning: v.meaning,
            usage_example: v.usage_example,
            phonetic_notation: v.phonetic_notation,
            language_frequency: v.language_frequency,
            file_type: v.file_type,
            file_path,
            thumbnail_path,
            youtube_url,
            speaker_id: Some(v.speaker_id),
            onomatopoeia_type_id: v.onomatopoeia_type_id,
            village_id: v.village_id,
            title: v.title,
            description: v.description,
            recorded_date: v.recorded_date,
            notes: v.notes,
        })
    }

    async fn geographic_fields(
        &self,
        v: ValidatedGeographicRecord,
        uploaded: &mut Vec<String>,
    ) -> Result<GeographicRecordFields, ArchiveError> {
        let (file_path, youtube_url) = self.resolve_media(v.media, uploaded).await?;
        let thumbnail_path = match v.thumbnail {
            Some(thumb) => self.resolve_media(thumb, uploaded).await?.0,
            None => None,
        };
        Ok(GeographicRecordFields {
            title: v.title,
            content_type: v.content_type,
            file_path,
            thumbnail_path,
            youtube_url,
            description: v.description,
            village_id: Some(v.village_id),
            latitude: v.latitude,
            longitude: v.longitude,
            captured_date: v.captured_date,
        })
    }

    /// Splits a media source into `(file_path, youtube_url)`, uploading new
    /// binaries on the way. Uploaded URLs are remembered for cleanup.
    async fn resolve_media(
        &self,
        source: MediaSource,
        uploaded: &mut Vec<String>,
    ) -> Result<(Option<String>, Option<String>), MediaError> {
        match source {
            MediaSource::Upload(file) => {
                let url = self.media.save(&file).await?;
                uploaded.push(url.clone());
                Ok((Some(url), None))
            }
            MediaSource::Stored(url) => Ok((Some(url), None)),
            MediaSource::YouTube(url) => Ok((None, Some(url))),
        }
    }

    /// Removes this request's uploads when the write did not go through.
    async fn finish<T>(
        &self,
        result: Result<T, ArchiveError>,
        uploaded: &[String],
    ) -> Result<T, ArchiveError> {
        if result.is_err() {
            for url in uploaded {
                if let Err(e) = self.media.delete(url).await {
                    warn!("failed to discard orphaned upload {}: {}", url, e);
                }
            }
        }
        result
    }
}

fn is_foreign_key_violation(err: &DbErr) -> bool {
    matches!(
        err.sql_err(),
        Some(SqlErr::ForeignKeyConstraintViolation(_))
    )
}
