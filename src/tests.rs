use std::collections::LinkedList;

use pretty_assertions::assert_eq;

use crate::config::{parse_block, parse_int, parse_real, parse_symbol, ConfigLoader, FieldParse};
use crate::snapshot::{checksum_snapshot, load_snapshot, save_snapshot, Snapshot};
use crate::transfer::{ChecksumFolder, Transfer, TransferOptions, TransferSink, TransferVersion};
use crate::types::{Coord3, ObjectId};
use crate::{CaseMode, Result, StateContext, Symbol, SymbolTable, TransferError};

fn init_logger() {
    pretty_env_logger::try_init().ok();
}

const UNIT_VERSION: TransferVersion = 2;

#[derive(Clone, Debug, Default, PartialEq)]
struct Unit {
    template: Symbol,
    id: ObjectId,
    position: Coord3,
    health: f32,
    max_health: f32,
    label: String,
    waypoints: Vec<Coord3>,
    attackers: LinkedList<ObjectId>,
    // derived after load
    damaged: bool,
}

impl Unit {
    fn sample(context: &mut StateContext) -> Unit {
        Unit {
            template: context.intern("Tank"),
            id: ObjectId(17),
            position: Coord3::new(120.0, -45.5, 3.25),
            health: 340.0,
            max_health: 400.0,
            label: "Überpanzer".to_owned(),
            waypoints: vec![
                Coord3::new(0.0, 0.0, 0.0),
                Coord3::new(10.0, 5.0, 0.0),
                Coord3::new(20.0, 5.0, 1.0),
            ],
            attackers: vec![ObjectId(3), ObjectId(9)].into_iter().collect(),
            damaged: true,
        }
    }
}

impl Snapshot for Unit {
    fn transfer_state<S: TransferSink>(
        &mut self,
        xfer: &mut Transfer<S>,
        context: &mut StateContext,
    ) -> Result<()> {
        let mut version = UNIT_VERSION;
        xfer.transfer_version(&mut version, UNIT_VERSION)?;
        xfer.transfer_symbol_name(&mut self.template, context.symbols_mut(), CaseMode::Sensitive)?;
        xfer.transfer_value(&mut self.id)?;
        xfer.transfer_value(&mut self.position)?;
        xfer.transfer_f32(&mut self.health)?;
        xfer.transfer_f32(&mut self.max_health)?;
        if version >= 2 {
            xfer.transfer_string(&mut self.label)?;
        }
        xfer.transfer_vec(&mut self.waypoints)?;
        xfer.transfer_linked_list(&mut self.attackers)?;
        Ok(())
    }

    fn load_post_process(&mut self, _context: &mut StateContext) -> Result<()> {
        self.damaged = self.health < self.max_health;
        Ok(())
    }
}

#[test]
fn test_interning_scenario() {
    let mut table = SymbolTable::default();
    assert_eq!(table.intern("Tank", CaseMode::Sensitive), Symbol::from_key(1));
    assert_eq!(table.intern("Infantry", CaseMode::Sensitive), Symbol::from_key(2));
    assert_eq!(table.intern("Tank", CaseMode::Sensitive), Symbol::from_key(1));
    assert_eq!(table.len(), 2);
    assert_eq!(table.resolve(Symbol::from_key(2)), Some("Infantry"));
}

#[test]
fn test_snapshot_round_trip() {
    init_logger();
    let mut context = StateContext::default();
    let mut unit = Unit::sample(&mut context);
    let bytes = save_snapshot(&mut unit, &mut context, "unit").unwrap();

    // a fresh session on another machine
    let mut other = StateContext::default();
    other.intern("Infantry");
    let mut loaded = Unit::default();
    load_snapshot(&mut loaded, &mut other, &bytes, "unit", TransferOptions::NONE).unwrap();

    assert_eq!(other.resolve(loaded.template), Some("Tank"));
    assert_eq!(loaded.template, Symbol::from_key(2));
    loaded.template = unit.template;
    assert_eq!(loaded, unit);
}

#[test]
fn test_post_processing_can_be_skipped() {
    let mut context = StateContext::default();
    let mut unit = Unit::sample(&mut context);
    let bytes = save_snapshot(&mut unit, &mut context, "unit").unwrap();

    let mut loaded = Unit::default();
    load_snapshot(
        &mut loaded,
        &mut context,
        &bytes,
        "unit",
        TransferOptions::NO_POST_PROCESSING,
    )
    .unwrap();
    assert!(!loaded.damaged);

    let mut loaded = Unit::default();
    load_snapshot(&mut loaded, &mut context, &bytes, "unit", TransferOptions::NONE).unwrap();
    assert!(loaded.damaged);
}

#[test]
fn test_checksum_agrees_after_transfer() {
    let mut context = StateContext::default();
    let mut unit = Unit::sample(&mut context);
    let before = checksum_snapshot(&mut unit, &mut context, "unit").unwrap();
    assert_eq!(checksum_snapshot(&mut unit, &mut context, "unit").unwrap(), before);

    let bytes = save_snapshot(&mut unit, &mut context, "unit").unwrap();
    let mut peer = StateContext::default();
    let mut replica = Unit::default();
    load_snapshot(&mut replica, &mut peer, &bytes, "unit", TransferOptions::NONE).unwrap();
    assert_eq!(checksum_snapshot(&mut replica, &mut peer, "unit").unwrap(), before);

    // a single diverged field is a desync
    replica.position.z += 0.5;
    assert_ne!(checksum_snapshot(&mut replica, &mut peer, "unit").unwrap(), before);
}

#[test]
fn test_checksum_is_order_sensitive() {
    let mut context = StateContext::default();
    let mut unit = Unit::sample(&mut context);
    let before = checksum_snapshot(&mut unit, &mut context, "unit").unwrap();
    unit.waypoints.reverse();
    assert_ne!(checksum_snapshot(&mut unit, &mut context, "unit").unwrap(), before);
}

#[test]
fn test_newer_snapshot_is_rejected() {
    let mut context = StateContext::default();
    let mut unit = Unit::sample(&mut context);
    let mut bytes = save_snapshot(&mut unit, &mut context, "unit").unwrap();
    bytes[0] = UNIT_VERSION + 1;

    let mut loaded = Unit::default();
    match load_snapshot(&mut loaded, &mut context, &bytes, "unit", TransferOptions::NONE) {
        Err(TransferError::SchemaVersionTooNew { stored: 3, current: 2 }) => (),
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn test_load_into_populated_unit_fails() {
    let mut context = StateContext::default();
    let mut unit = Unit::sample(&mut context);
    let bytes = save_snapshot(&mut unit, &mut context, "unit").unwrap();

    let mut loaded = Unit::default();
    loaded.waypoints.push(Coord3::default());
    match load_snapshot(&mut loaded, &mut context, &bytes, "unit", TransferOptions::NONE) {
        Err(TransferError::ContainerNotEmptyOnLoad) => (),
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn test_truncated_snapshot_fails() {
    let mut context = StateContext::default();
    let mut unit = Unit::sample(&mut context);
    let bytes = save_snapshot(&mut unit, &mut context, "unit").unwrap();

    let mut loaded = Unit::default();
    match load_snapshot(
        &mut loaded,
        &mut context,
        &bytes[..bytes.len() - 1],
        "unit",
        TransferOptions::NONE,
    ) {
        Err(TransferError::Io(_)) => (),
        other => panic!("unexpected result {:?}", other),
    }
}

// Writes an extension block that `LegacyCrate` predates.
#[derive(Debug, Default)]
struct ModernCrate {
    value: u32,
    salvage: Vec<ObjectId>,
    owner: i32,
}

impl Snapshot for ModernCrate {
    fn transfer_state<S: TransferSink>(
        &mut self,
        xfer: &mut Transfer<S>,
        _context: &mut StateContext,
    ) -> Result<()> {
        xfer.transfer_u32(&mut self.value)?;
        xfer.begin_block()?;
        xfer.transfer_vec(&mut self.salvage)?;
        xfer.end_block()?;
        xfer.transfer_i32(&mut self.owner)
    }
}

#[derive(Debug, Default)]
struct LegacyCrate {
    value: u32,
    owner: i32,
}

impl Snapshot for LegacyCrate {
    fn transfer_state<S: TransferSink>(
        &mut self,
        xfer: &mut Transfer<S>,
        _context: &mut StateContext,
    ) -> Result<()> {
        xfer.transfer_u32(&mut self.value)?;
        let len = xfer.begin_block()?;
        xfer.skip(len)?;
        xfer.end_block()?;
        xfer.transfer_i32(&mut self.owner)
    }
}

#[test]
fn test_old_reader_skips_unknown_block() {
    let mut context = StateContext::default();
    let mut modern = ModernCrate {
        value: 500,
        salvage: vec![ObjectId(4), ObjectId(5)],
        owner: -1,
    };
    let bytes = save_snapshot(&mut modern, &mut context, "crate").unwrap();

    let mut legacy = LegacyCrate::default();
    load_snapshot(&mut legacy, &mut context, &bytes, "crate", TransferOptions::NONE).unwrap();
    assert_eq!((legacy.value, legacy.owner), (500, -1));
}

#[derive(Debug, Default)]
struct WeaponTemplate {
    name: Symbol,
    damage: i32,
    range: f32,
}

fn weapon_fields() -> Vec<FieldParse<WeaponTemplate>> {
    vec![
        FieldParse {
            name: "Name",
            parse: |loader, context, weapon| {
                weapon.name = parse_symbol(loader, context)?;
                Ok(())
            },
        },
        FieldParse {
            name: "Damage",
            parse: |loader, _, weapon| {
                weapon.damage = parse_int(loader)?;
                Ok(())
            },
        },
        FieldParse {
            name: "Range",
            parse: |loader, _, weapon| {
                weapon.range = parse_real(loader)?;
                Ok(())
            },
        },
    ]
}

// Loads a weapon definition while mirroring the text into a checksum pass.
fn peer_load(text: &str) -> (WeaponTemplate, u32) {
    let mut context = StateContext::default();
    let mut xfer = Transfer::new(ChecksumFolder::new());
    xfer.open("configuration").unwrap();

    let mut weapon = WeaponTemplate::default();
    {
        let mut loader = ConfigLoader::new();
        loader.attach_transfer(&mut xfer);
        loader.open_str("weapons.ini", text).unwrap();
        parse_block(&mut loader, &mut context, &mut weapon, &weapon_fields()).unwrap();
        loader.close();
    }
    xfer.close().unwrap();
    assert_eq!(context.resolve(weapon.name), Some("Cannon"));
    (weapon, xfer.sink().value())
}

#[test]
fn test_peers_verify_identical_configuration() {
    init_logger();
    let text = "Name = Cannon\nDamage = 60\nRange = 175.0\nEnd\n";
    let (local, local_crc) = peer_load(text);
    let (_, remote_crc) = peer_load(text);
    assert_eq!(local_crc, remote_crc);
    assert_eq!((local.damage, local.range), (60, 175.0));

    // a peer with a tweaked comment still loads the same values, but the raw text differs
    let (tweaked, tweaked_crc) = peer_load("Name = Cannon ; main gun\nDamage = 60\nRange = 175.0\nEnd\n");
    assert_eq!((tweaked.damage, tweaked.range), (60, 175.0));
    assert_ne!(tweaked_crc, local_crc);
}
