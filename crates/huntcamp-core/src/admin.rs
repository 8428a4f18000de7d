use crate::occupancy::release_hunter;
use crate::state::CampState;
use crate::CoreError;
use huntcamp_store::{Hunter, HunterId, HunterProfile, Repository, Stand, StandId};
use tracing::{info, warn};

pub use huntcamp_store::DEFAULT_PIN;

#[derive(Debug, Clone, Default)]
pub struct NewHunter {
    pub name: String,
    pub pin: Option<String>,
    pub is_admin: Option<bool>,
}

fn require_name<'a>(name: &'a str, what: &str) -> Result<&'a str, CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation(format!("{what} name is required")));
    }
    Ok(name)
}

pub fn add_hunter(state: &mut CampState, new: NewHunter) -> Result<HunterProfile, CoreError> {
    require_name(&new.name, "hunter")?;
    if state.hunters.find_by_name(&new.name).is_some() {
        warn!("adding a second hunter named '{}'; login needs distinct pins", new.name);
    }
    let pin = match new.pin {
        Some(pin) if !pin.is_empty() => pin,
        _ => DEFAULT_PIN.to_owned(),
    };
    let hunter = Hunter {
        id: state.counters.allocate_hunter(),
        name: new.name,
        pin,
        is_admin: new.is_admin.unwrap_or(false),
        current_stand: None,
    };
    info!("added hunter {} (id {})", hunter.name, hunter.id);
    let profile = hunter.profile();
    state.hunters.push(hunter);
    Ok(profile)
}

/// Remove a hunter, first freeing any stand they hold. Nothing is logged.
///
/// Returns the removed record, or `None` if no hunter had that id.
pub fn remove_hunter(state: &mut CampState, hunter_id: HunterId) -> Option<Hunter> {
    if let Some(stand_id) = release_hunter(state, hunter_id) {
        info!("released stand {stand_id} held by removed hunter {hunter_id}");
    }
    let removed = state.hunters.remove(hunter_id)?;
    info!("removed hunter {} (id {hunter_id})", removed.name);
    Some(removed)
}

pub fn rename_stand(state: &mut CampState, stand_id: StandId, name: &str) -> Result<Stand, CoreError> {
    let stand = state
        .stands
        .find_by_id_mut(stand_id)
        .ok_or(CoreError::StandNotFound(stand_id))?;
    let name = require_name(name, "stand")?;
    info!("renamed stand {stand_id} from '{}' to '{name}'", stand.name);
    name.clone_into(&mut stand.name);
    Ok(stand.clone())
}

pub fn add_stand(state: &mut CampState, name: &str) -> Result<Stand, CoreError> {
    let name = require_name(name, "stand")?;
    let stand = Stand::new(state.counters.allocate_stand(), name);
    info!("added stand {} (id {})", stand.name, stand.id);
    state.stands.push(stand.clone());
    Ok(stand)
}

/// Plaintext match on name and pin.
///
/// Names may repeat, so the pin takes part in the search instead of
/// looking the name up first.
pub fn login(hunters: &Repository<Hunter>, name: &str, pin: &str) -> Result<HunterProfile, CoreError> {
    hunters
        .all()
        .iter()
        .find(|h| h.name == name && h.pin == pin)
        .map(Hunter::profile)
        .ok_or(CoreError::InvalidCredentials)
}
