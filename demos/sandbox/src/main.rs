// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Runs the SDK against a simulated host for a few hundred frames.
//!
//! Usage: `sandbox [config.json]`

use anyhow::{Context, Result};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;
use tether_infra::DynamicObject;
use tether_sdk::prelude::*;
use tether_sdk::init_logging;

const FRAMES: u32 = 400;
const HUB_FRAME: u32 = 20;
const PLANET_FRAME: u32 = 150;

/// The pieces of the fake host the demo mutates over time.
struct SimulatedHost {
    root: Arc<DynamicObject>,
    water: Arc<AtomicU32>,
}

impl SimulatedHost {
    fn new() -> Self {
        Self {
            root: DynamicObject::new("Host"),
            water: Arc::new(AtomicU32::new(0)),
        }
    }

    /// The hub and its command bus appear together.
    fn boot_hub(&self) {
        let water = Arc::clone(&self.water);
        let command_bus = DynamicObject::builder("CommandBus")
            .method("ExecuteCommand", move |args: &[NativeValue]| {
                let Some(command) = args.first().and_then(NativeValue::as_object) else {
                    return Ok(NativeValue::Bool(false));
                };
                if command.type_name() == "ImportResourceCommand" {
                    let amount = command
                        .field("amount")
                        .and_then(|v| v.as_i64())
                        .unwrap_or(0);
                    water.fetch_add(u32::try_from(amount).unwrap_or(0), Ordering::SeqCst);
                }
                // The host refuses to go faster than 5x.
                let speed = command.field("speed").and_then(|v| v.as_f64()).unwrap_or(0.0);
                Ok(NativeValue::Bool(speed <= 5.0))
            })
            .build();

        self.root
            .set_field("GameHub", NativeValue::Object(DynamicObject::new("GameHub")));
        self.root
            .set_field("CommandBus", NativeValue::Object(command_bus));
    }

    fn load_planet(&self) {
        let planet = DynamicObject::builder("Planet").field("Name", "Kepler").build();
        let universe = DynamicObject::builder("Universe")
            .property("CurrentPlanet", NativeValue::Object(planet))
            .build();
        self.root.set_field("_universe", NativeValue::Object(universe));
    }
}

fn subscribe_logging(sdk: &Sdk) {
    let events = sdk.events();
    events.subscribe(|e: &GameHubReady| log::info!("[tick {}] Hub ready", e.tick));
    events.subscribe(|e: &EarlyModsReady| log::info!("[tick {}] Early mods ready", e.tick));
    events.subscribe(|e: &BaseGameDetected| log::info!("[tick {}] Base game detected", e.tick));
    events.subscribe(|e: &GameFullyLoaded| {
        log::info!("[tick {}] Game fully loaded ({:?})", e.tick, e.trigger)
    });
    events.subscribe(|e: &GameLoadTimedOut| {
        log::warn!("Game never loaded after {} ticks", e.waited_ticks)
    });
    events.subscribe(|e: &BuildingSpawned| {
        log::info!(
            "Building {} ({}) spawned at ({}, {}), wrapped: {}",
            e.building_id,
            e.building_type,
            e.position.x,
            e.position.y,
            e.entity.is_wrapped()
        )
    });

    sdk.on_command_executed(|e| {
        log::info!(
            "Executed {} in {} ms",
            e.result.command(),
            e.result.execution_time_ms()
        )
    });
    sdk.on_command_failed(|e| log::warn!("Failed {}: {}", e.result.command(), e.error));
}

fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => SdkConfig::from_file(&path).with_context(|| format!("loading {path}"))?,
        None => SdkConfig::default(),
    };
    init_logging(&config.log_filter)?;

    let host = SimulatedHost::new();
    let root: NativeHandle = host.root.clone();
    let sdk = Sdk::with_host(root, config);
    subscribe_logging(&sdk);

    for frame in 1..=FRAMES {
        match frame {
            HUB_FRAME => host.boot_hub(),
            PLANET_FRAME => host.load_planet(),
            _ => {}
        }

        if frame == HUB_FRAME + 1 {
            let commands = sdk.commands();
            commands.import_resource(None, "WATER", 1000)?;
            commands.unlock_building(None, "Greenhouse")?;
            commands.set_game_speed(8.0)?;
            commands.import_resource(None, "", 5)?;
        }

        if frame == HUB_FRAME + 2 {
            // Host hooks may fire on their own threads.
            let hook = sdk.native_hook();
            thread::spawn(move || {
                let building = DynamicObject::builder("Building")
                    .field("Id", "B-1")
                    .field("BuildingType", "Greenhouse")
                    .field("Position", NativeValue::Vector2 { x: 12.0, y: 4.0 })
                    .build();
                hook.emit("BuildingSpawned", NativeValue::Object(building));
            })
            .join()
            .map_err(|_| anyhow::anyhow!("host hook thread panicked"))?;
        }

        sdk.on_frame();
    }

    log::info!(
        "Finished in {:?}; stockpiled {} water; {:?}",
        sdk.lifecycle_state(),
        host.water.load(Ordering::SeqCst),
        sdk.dispatcher().statistics()
    );
    log::info!("Bus: {:?}", sdk.events().statistics());
    Ok(())
}
