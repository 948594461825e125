use crate::storage::entity::speaker;
use crate::storage::repository::LanguageRecordFields;
use log::info;

/// A language record always lives in its speaker's village. When the speaker
/// has a village it replaces whatever village was submitted; otherwise the
/// submitted value is kept. Returns true when the village was overridden.
pub fn inherit_speaker_village(
    fields: &mut LanguageRecordFields,
    speaker: Option<&speaker::Model>,
) -> bool {
    let Some(village_id) = speaker.and_then(|s| s.village_id) else {
        return false;
    };
    let changed = fields.village_id != Some(village_id);
    if changed {
        info!(
            "record village {:?} replaced by speaker's village {}",
            fields.village_id, village_id
        );
    }
    fields.village_id = Some(village_id);
    changed
}
