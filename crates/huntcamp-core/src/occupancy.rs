//! Check-in and check-out state transitions.
//!
//! Both operations validate fully before mutating anything, so a rejected
//! request leaves the state exactly as it was. Dangling references between
//! hunters and stands are repaired rather than reported, because the
//! collections are persisted as separate files and may have drifted.

use crate::activity::Event;
use crate::state::CampState;
use crate::CoreError;
use huntcamp_store::{ActivityKind, HunterId, HunterProfile, Stand, StandId};
use tracing::{info, warn};

/// Stand name logged when a hunter's stand record no longer exists.
pub const UNKNOWN_STAND: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckIn {
    pub stand: Stand,
    pub hunter: HunterProfile,
    /// The stand the hunter was released from, if any.
    pub released: Option<StandId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOut {
    pub stand_id: StandId,
    pub stand_name: String,
}

pub fn check_in(
    state: &mut CampState,
    hunter_id: HunterId,
    stand_id: StandId,
    now: &str,
) -> Result<CheckIn, CoreError> {
    let stand = state
        .stands
        .find_by_id(stand_id)
        .ok_or(CoreError::StandNotFound(stand_id))?;
    let hunter = state
        .hunters
        .find_by_id(hunter_id)
        .ok_or(CoreError::HunterNotFound(hunter_id))?;
    if stand.occupied {
        return Err(CoreError::StandOccupied {
            stand: stand.name.clone(),
        });
    }
    let hunter_name = hunter.name.clone();
    let prior = hunter.current_stand;

    let mut released = None;
    if let Some(prior_id) = prior {
        match state.stands.find_by_id_mut(prior_id) {
            Some(old) => {
                old.release();
                released = Some(prior_id);
            }
            None => warn!("hunter {hunter_name} held missing stand {prior_id}; skipping release"),
        }
    }

    // The stand is free, so anyone else still pointing at it is stale.
    for other in state.hunters.iter_mut() {
        if other.id != hunter_id && other.current_stand == Some(stand_id) {
            warn!(
                "clearing stale claim of hunter {} on stand {stand_id}",
                other.name
            );
            other.current_stand = None;
        }
    }

    let Some(stand) = state.stands.find_by_id_mut(stand_id) else {
        return Err(CoreError::StandNotFound(stand_id));
    };
    stand.occupy(&hunter_name, now);
    let stand = stand.clone();

    let Some(hunter) = state.hunters.find_by_id_mut(hunter_id) else {
        return Err(CoreError::HunterNotFound(hunter_id));
    };
    hunter.current_stand = Some(stand_id);
    let hunter = hunter.profile();

    state.activity.record(
        &mut state.counters,
        Event {
            kind: ActivityKind::Checkin,
            hunter: &hunter_name,
            stand: Some(&stand.name),
            description: None,
        },
        now,
    );
    info!("{hunter_name} checked in to {}", stand.name);

    Ok(CheckIn {
        stand,
        hunter,
        released,
    })
}

pub fn check_out(
    state: &mut CampState,
    hunter_id: HunterId,
    now: &str,
) -> Result<CheckOut, CoreError> {
    let (hunter_name, stand_id) = match state.hunters.find_by_id(hunter_id) {
        Some(h) => match h.current_stand {
            Some(stand_id) => (h.name.clone(), stand_id),
            None => return Err(CoreError::NotCheckedIn(hunter_id)),
        },
        None => return Err(CoreError::NotCheckedIn(hunter_id)),
    };

    let stand_name = match state.stands.find_by_id_mut(stand_id) {
        Some(stand) => {
            stand.release();
            stand.name.clone()
        }
        None => {
            warn!("hunter {hunter_name} held missing stand {stand_id}; checking out anyway");
            UNKNOWN_STAND.to_owned()
        }
    };

    if let Some(hunter) = state.hunters.find_by_id_mut(hunter_id) {
        hunter.current_stand = None;
    }

    state.activity.record(
        &mut state.counters,
        Event {
            kind: ActivityKind::Checkout,
            hunter: &hunter_name,
            stand: Some(&stand_name),
            description: None,
        },
        now,
    );
    info!("{hunter_name} checked out of {stand_name}");

    Ok(CheckOut {
        stand_id,
        stand_name,
    })
}

/// Free the stand held by `hunter_id` without logging. Used when a hunter is
/// removed. Returns the released stand id.
pub(crate) fn release_hunter(state: &mut CampState, hunter_id: HunterId) -> Option<StandId> {
    let stand_id = state.hunters.find_by_id(hunter_id)?.current_stand?;
    let stand = state.stands.find_by_id_mut(stand_id)?;
    stand.release();
    Some(stand_id)
}
