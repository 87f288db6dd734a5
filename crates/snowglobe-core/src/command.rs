//! In-process command dispatcher.
//!
//! An external controller addresses simulation entities by string instance
//! id and invokes methods on them with positional JSON arguments. The
//! dispatcher owns only the instance table; the state it acts on is passed
//! to every [`CommandDispatcher::dispatch`] call.
//!
//! # Methods
//!
//! | Instance | Method | Args | Value |
//! |----------|--------|------|-------|
//! | character | `get_status` | | status object |
//! | character | `get_inventory` | | inventory snapshot |
//! | character | `move_to` | `x`, `y` | waypoint count |
//! | character | `move_to_random` | | chosen cell |
//! | character | `harvest_nearest` | | target and products |
//! | character | `chop_nearest` | | target and products |
//! | character | `use_item` | `item_id` | consume outcome |
//! | character | `equip` | `item_id` | previously equipped id or null |
//! | character | `unequip` | | unequipped id |
//! | character | `plant_fruit` | `item_id` | new plant id |
//! | plant | `get_info` | | plant info |
//! | plant | `grow` | | whether it grew |
//! | plant | `harvest` | optional character instance | products |
//! | plant | `chop` | optional character instance | products |
//! | world | `nearby_cells` | `x`, `y`, `radius` | cell list |

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use snowglobe_types::{EntityId, GridCell};
use snowglobe_world::WorldError;
use tracing::{debug, warn};

use crate::state::{SimulationError, SimulationState};

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// A method call addressed to a registered instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandRequest {
    /// Caller-chosen id echoed in the response.
    #[serde(default)]
    pub call_id: u64,
    /// Registered instance to invoke.
    pub instance_id: String,
    /// Method name.
    #[serde(alias = "method_name")]
    pub method: String,
    /// Positional arguments.
    #[serde(default)]
    pub args: Vec<Value>,
}

/// Result of a [`CommandRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResponse {
    /// The request's `call_id`.
    pub call_id: u64,
    /// Whether the call succeeded.
    pub success: bool,
    /// Return value on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Error message on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CommandResponse {
    fn ok(call_id: u64, value: Value) -> Self {
        Self {
            call_id,
            success: true,
            value: Some(value),
            error: None,
        }
    }

    fn failed(call_id: u64, error: &CommandError) -> Self {
        Self {
            call_id,
            success: false,
            value: None,
            error: Some(error.to_string()),
        }
    }
}

/// Errors from resolving or executing a command.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// No instance is registered under this id.
    #[error("unknown instance: {0}")]
    UnknownInstance(String),

    /// The instance has no such method.
    #[error("{instance} has no method {method}")]
    UnknownMethod {
        /// The instance kind.
        instance: &'static str,
        /// The requested method.
        method: String,
    },

    /// A required argument was not supplied.
    #[error("{method}: missing argument {index}")]
    MissingArgument {
        /// The method called.
        method: String,
        /// Position of the missing argument.
        index: usize,
    },

    /// An argument had the wrong shape.
    #[error("{method}: invalid argument {index}: {source}")]
    InvalidArgument {
        /// The method called.
        method: String,
        /// Position of the bad argument.
        index: usize,
        /// Why it did not parse.
        source: serde_json::Error,
    },

    /// The registered plant no longer exists.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },

    /// The simulation rejected the call.
    #[error("{source}")]
    Simulation {
        /// The underlying simulation error.
        #[from]
        source: SimulationError,
    },

    /// The return value could not be serialized.
    #[error("serialization error: {source}")]
    Serialize {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// What an instance id refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instance {
    /// A character.
    Character(EntityId),
    /// A plant.
    Plant(EntityId),
    /// The world itself.
    World,
}

/// Routes [`CommandRequest`]s to simulation operations.
#[derive(Debug, Clone, Default)]
pub struct CommandDispatcher {
    instances: BTreeMap<String, Instance>,
}

impl CommandDispatcher {
    /// Create a dispatcher with no instances.
    pub const fn new() -> Self {
        Self {
            instances: BTreeMap::new(),
        }
    }

    /// Register a character under `instance_id`.
    pub fn register_character(&mut self, instance_id: impl Into<String>, id: EntityId) {
        self.register(instance_id.into(), Instance::Character(id));
    }

    /// Register a plant under `instance_id`.
    pub fn register_plant(&mut self, instance_id: impl Into<String>, id: EntityId) {
        self.register(instance_id.into(), Instance::Plant(id));
    }

    /// Register the world under `instance_id`.
    pub fn register_world(&mut self, instance_id: impl Into<String>) {
        self.register(instance_id.into(), Instance::World);
    }

    fn register(&mut self, instance_id: String, instance: Instance) {
        if let Some(previous) = self.instances.insert(instance_id.clone(), instance) {
            warn!(instance = %instance_id, ?previous, "Instance id re-registered");
        }
    }

    /// Forget an instance. Returns whether it was registered.
    pub fn unregister(&mut self, instance_id: &str) -> bool {
        self.instances.remove(instance_id).is_some()
    }

    /// Look up an instance.
    pub fn instance(&self, instance_id: &str) -> Option<Instance> {
        self.instances.get(instance_id).copied()
    }

    /// Execute `request` against `state`. Failures are reported in the
    /// response, never raised.
    pub fn dispatch(&self, state: &mut SimulationState, request: &CommandRequest) -> CommandResponse {
        match self.execute(state, request) {
            Ok(value) => {
                debug!(call = request.call_id, instance = %request.instance_id, method = %request.method, "Command succeeded");
                CommandResponse::ok(request.call_id, value)
            }
            Err(e) => {
                debug!(call = request.call_id, instance = %request.instance_id, method = %request.method, error = %e, "Command failed");
                CommandResponse::failed(request.call_id, &e)
            }
        }
    }

    fn execute(&self, state: &mut SimulationState, request: &CommandRequest) -> Result<Value, CommandError> {
        let instance = self
            .instance(&request.instance_id)
            .ok_or_else(|| CommandError::UnknownInstance(request.instance_id.clone()))?;
        let call = Call {
            method: &request.method,
            args: &request.args,
        };
        match instance {
            Instance::Character(id) => character_method(state, id, &call),
            Instance::Plant(id) => self.plant_method(state, id, &call),
            Instance::World => world_method(state, &call),
        }
    }

    fn plant_method(&self, state: &mut SimulationState, plant: EntityId, call: &Call<'_>) -> Result<Value, CommandError> {
        match call.method {
            "get_info" => {
                let info = state
                    .world
                    .plant(plant)
                    .ok_or(WorldError::PlantNotFound(plant))?
                    .info();
                to_value(&info)
            }
            "grow" => {
                let grew = state
                    .world
                    .plant_mut(plant)
                    .ok_or(WorldError::PlantNotFound(plant))?
                    .grow();
                Ok(Value::Bool(grew))
            }
            "harvest" => {
                let products = match self.optional_character(call, 0)? {
                    Some(character) => state.harvest(character, plant)?,
                    None => state.world.harvest(plant, None, &state.catalog)?,
                };
                to_value(&products)
            }
            "chop" => {
                let products = match self.optional_character(call, 0)? {
                    Some(character) => state.chop(character, plant)?,
                    None => state.world.chop(plant, None, &state.catalog)?,
                };
                to_value(&products)
            }
            _ => Err(call.unknown("plant")),
        }
    }

    fn optional_character(&self, call: &Call<'_>, index: usize) -> Result<Option<EntityId>, CommandError> {
        let Some(instance_id) = call.optional::<String>(index)? else {
            return Ok(None);
        };
        match self.instance(&instance_id) {
            Some(Instance::Character(id)) => Ok(Some(id)),
            _ => Err(CommandError::UnknownInstance(instance_id)),
        }
    }
}

fn character_method(state: &mut SimulationState, character: EntityId, call: &Call<'_>) -> Result<Value, CommandError> {
    let not_found = || SimulationError::CharacterNotFound(character);
    match call.method {
        "get_status" => to_value(&state.character(character).ok_or_else(not_found)?.status()),
        "get_inventory" => to_value(
            &state
                .character(character)
                .ok_or_else(not_found)?
                .inventory_snapshot(),
        ),
        "move_to" => {
            let cell = GridCell::new(call.arg(0)?, call.arg(1)?);
            to_value(&state.move_to(character, cell)?)
        }
        "move_to_random" => to_value(&state.move_to_random(character)?),
        "harvest_nearest" => to_value(&state.harvest_nearest(character)?),
        "chop_nearest" => to_value(&state.chop_nearest(character)?),
        "use_item" => {
            let item: String = call.arg(0)?;
            to_value(&state.use_item(character, &item)?)
        }
        "equip" => {
            let item: String = call.arg(0)?;
            to_value(&state.equip(character, &item)?)
        }
        "unequip" => to_value(&state.unequip(character)?),
        "plant_fruit" => {
            let item: String = call.arg(0)?;
            to_value(&state.plant_fruit(character, &item)?)
        }
        _ => Err(call.unknown("character")),
    }
}

fn world_method(state: &SimulationState, call: &Call<'_>) -> Result<Value, CommandError> {
    match call.method {
        "nearby_cells" => {
            let center = GridCell::new(call.arg(0)?, call.arg(1)?);
            to_value(&state.nearby_cells(center, call.arg(2)?))
        }
        _ => Err(call.unknown("world")),
    }
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, CommandError> {
    Ok(serde_json::to_value(value)?)
}

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

struct Call<'a> {
    method: &'a str,
    args: &'a [Value],
}

impl Call<'_> {
    fn arg<T: DeserializeOwned>(&self, index: usize) -> Result<T, CommandError> {
        self.optional(index)?.ok_or_else(|| CommandError::MissingArgument {
            method: self.method.to_owned(),
            index,
        })
    }

    fn optional<T: DeserializeOwned>(&self, index: usize) -> Result<Option<T>, CommandError> {
        match self.args.get(index) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone()).map(Some).map_err(|source| {
                CommandError::InvalidArgument {
                    method: self.method.to_owned(),
                    index,
                    source,
                }
            }),
        }
    }

    fn unknown(&self, instance: &'static str) -> CommandError {
        CommandError::UnknownMethod {
            instance,
            method: self.method.to_owned(),
        }
    }
}
