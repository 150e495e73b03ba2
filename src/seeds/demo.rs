//! Demo data seeding
//!
//! Creates five demo clients, each with its own custom fields and two
//! buildings. Every record is looked up before it is created, so running the
//! seed again leaves existing data alone. Values are applied in lenient mode.

use anyhow::{Context, Result};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};
use serde_json::{Map, Value};

use crate::fields::{FieldKind, ProposedField};
use crate::models::{Building, Client, CustomField, CustomFieldValue};
use crate::repositories::{
    BuildingAttributes, BuildingRepository, ClientRepository, CustomFieldRepository,
};
use crate::services::BuildingService;

/// Row counts after seeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub clients: u64,
    pub custom_fields: u64,
    pub buildings: u64,
    pub custom_field_values: u64,
}

struct FieldSeed {
    name: &'static str,
    kind: FieldKind,
    options: &'static [&'static str],
}

struct BuildingSeed {
    street: &'static str,
    city: &'static str,
    state: &'static str,
    zip: &'static str,
    country: &'static str,
    values: &'static [(&'static str, &'static str)],
}

struct ClientSeed {
    name: &'static str,
    fields: &'static [FieldSeed],
    buildings: &'static [BuildingSeed],
}

const fn number(name: &'static str) -> FieldSeed {
    FieldSeed {
        name,
        kind: FieldKind::Number,
        options: &[],
    }
}

const fn freeform(name: &'static str) -> FieldSeed {
    FieldSeed {
        name,
        kind: FieldKind::Freeform,
        options: &[],
    }
}

const fn choice(name: &'static str, options: &'static [&'static str]) -> FieldSeed {
    FieldSeed {
        name,
        kind: FieldKind::Enum,
        options,
    }
}

const DEMO_CLIENTS: &[ClientSeed] = &[
    ClientSeed {
        name: "Thejo Client1",
        fields: &[
            number("area_sqft"),
            choice("roof_type", &["Shingle", "Metal"]),
            freeform("brick_color"),
        ],
        buildings: &[
            BuildingSeed {
                street: "1 Main St",
                city: "Austin",
                state: "TX",
                zip: "10000",
                country: "US",
                values: &[
                    ("area_sqft", "25000"),
                    ("roof_type", "Shingle"),
                    ("brick_color", "Red"),
                ],
            },
            BuildingSeed {
                street: "2 Main St",
                city: "Dallas",
                state: "TX",
                zip: "10001",
                country: "US",
                values: &[
                    ("area_sqft", "85000"),
                    ("roof_type", "Metal"),
                    ("brick_color", "Blue"),
                ],
            },
        ],
    },
    ClientSeed {
        name: "Thejo Client2",
        fields: &[
            number("rock_wall_length"),
            number("area_sqft"),
            number("rock_wall_size"),
            choice("building_type", &["Single Family", "Multi Family"]),
        ],
        buildings: &[
            BuildingSeed {
                street: "100 Some Street",
                city: "Some City",
                state: "Some State",
                zip: "99999",
                country: "US",
                values: &[
                    ("rock_wall_length", "250"),
                    ("area_sqft", "25000"),
                    ("rock_wall_size", "10"),
                    ("building_type", "Single Family"),
                ],
            },
            BuildingSeed {
                street: "200 Some Street",
                city: "Some City 2",
                state: "Some State 2",
                zip: "88888",
                country: "US",
                values: &[
                    ("rock_wall_length", "250"),
                    ("area_sqft", "25000"),
                    ("rock_wall_size", "10"),
                    ("building_type", "Multi Family"),
                ],
            },
        ],
    },
    ClientSeed {
        name: "Thejo Client3",
        fields: &[choice("type", &["New", "Existing"]), number("year")],
        buildings: &[
            BuildingSeed {
                street: "999 Some Street",
                city: "Some City 3",
                state: "Some State 3",
                zip: "11111",
                country: "US",
                values: &[("type", "New"), ("year", "2022")],
            },
            BuildingSeed {
                street: "400 Some Street",
                city: "Some City 4",
                state: "Some State 4",
                zip: "22222",
                country: "US",
                values: &[("type", "Existing"), ("year", "1925")],
            },
        ],
    },
    ClientSeed {
        name: "Thejo Client4",
        fields: &[number("windows"), choice("ceiling_type", &["Flat", "Vaulted"])],
        buildings: &[
            BuildingSeed {
                street: "500 Some Street",
                city: "Some City 5",
                state: "Some State 5",
                zip: "33333",
                country: "US",
                values: &[("windows", "20"), ("ceiling_type", "Vaulted")],
            },
            BuildingSeed {
                street: "600 Some Street",
                city: "Some City 6",
                state: "Some State 6",
                zip: "44444",
                country: "US",
                values: &[("windows", "15"), ("ceiling_type", "Flat")],
            },
        ],
    },
    ClientSeed {
        name: "Thejo Client5",
        fields: &[choice("type", &["Commercial", "Residential"])],
        buildings: &[
            BuildingSeed {
                street: "700 Some Street",
                city: "Some City 7",
                state: "Some State 7",
                zip: "55555",
                country: "US",
                values: &[("type", "Commercial")],
            },
            BuildingSeed {
                street: "800 Some Street",
                city: "Some City 8",
                state: "Some State 8",
                zip: "66666",
                country: "US",
                values: &[("type", "Residential")],
            },
        ],
    },
];

/// Seeds the demo clients, fields, buildings and values.
pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<SeedSummary> {
    let clients = ClientRepository::new(db);
    let fields = CustomFieldRepository::new(db);
    let buildings = BuildingRepository::new(db);
    let service = BuildingService::new(db.clone());

    for seed in DEMO_CLIENTS {
        let client = match clients.find_by_name(seed.name).await? {
            Some(existing) => {
                log::info!("Client '{}' already exists, skipping", seed.name);
                existing
            }
            None => {
                log::info!("Creating client: {}", seed.name);
                clients
                    .create(seed.name)
                    .await
                    .with_context(|| format!("Failed to create client '{}'", seed.name))?
            }
        };

        for field in seed.fields {
            if fields.find_by_name(client.id, field.name).await?.is_some() {
                continue;
            }
            let mut proposed = ProposedField::new(field.name, field.kind);
            if !field.options.is_empty() {
                proposed = proposed.with_options(field.options.iter().copied());
            }
            fields
                .create(client.id, proposed)
                .await
                .with_context(|| {
                    format!("Failed to create field '{}' for '{}'", field.name, seed.name)
                })?;
        }

        for building_seed in seed.buildings {
            let building = match buildings
                .find_by_street(client.id, building_seed.street)
                .await?
            {
                Some(existing) => existing,
                None => {
                    log::info!("Creating building: {}", building_seed.street);
                    buildings
                        .create(
                            client.id,
                            BuildingAttributes {
                                street: Some(building_seed.street.to_string()),
                                city: Some(building_seed.city.to_string()),
                                state: Some(building_seed.state.to_string()),
                                zip: Some(building_seed.zip.to_string()),
                                country: Some(building_seed.country.to_string()),
                            },
                        )
                        .await
                        .with_context(|| {
                            format!("Failed to create building '{}'", building_seed.street)
                        })?
                }
            };

            let values: Map<String, Value> = building_seed
                .values
                .iter()
                .map(|(name, value)| (name.to_string(), Value::String(value.to_string())))
                .collect();
            let outcome = service
                .set_custom_field_values_lenient(building.id, &Value::Object(values))
                .await?;
            for message in outcome.messages() {
                log::warn!("{}: {}", building_seed.street, message);
            }
        }
    }

    let summary = SeedSummary {
        clients: Client::find().count(db).await?,
        custom_fields: CustomField::find().count(db).await?,
        buildings: Building::find().count(db).await?,
        custom_field_values: CustomFieldValue::find().count(db).await?,
    };

    log::info!(
        "Demo seeding completed: {} clients, {} custom fields, {} buildings, {} custom field values",
        summary.clients,
        summary.custom_fields,
        summary.buildings,
        summary.custom_field_values
    );
    Ok(summary)
}
