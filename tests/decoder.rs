use std::cell::{RefCell};
use std::collections::{VecDeque};

use vjoy_feeder::{DeviceId};
use vjoy_feeder::ffb::*;

/// A packet whose sub-records are spelled out directly.
#[derive(Clone, Debug, Default)]
struct Packet {
	header: Option<Header>,
	packet_type: Option<u32>,
	device_control: Option<u32>,
	new_effect: Option<NewEffect>,
	condition: Option<Condition>,
	effect_report: Option<EffectReport>,
	effect_operation: Option<EffectOperation>,
	device_gain: Option<u8>,
	envelope: Option<Envelope>,
	periodic: Option<Periodic>,
	ramp: Option<Ramp>,
	constant: Option<Constant>,
}

/// Records every accessor call, and answers PID reads from a queue. An empty queue means the
/// driver refuses the read.
#[derive(Default)]
struct Mock {
	calls: RefCell<Vec<&'static str>>,
	pids: RefCell<VecDeque<PidBlock>>,
}

impl Mock {
	fn with_pids(pids: impl IntoIterator<Item = PidBlock>) -> Mock {
		Mock {
			calls: RefCell::default(),
			pids: RefCell::new(pids.into_iter().collect()),
		}
	}

	fn log<T>(&self, name: &'static str, value: T) -> T {
		self.calls.borrow_mut().push(name);
		value
	}

	fn calls(&self) -> Vec<&'static str> {
		self.calls.borrow().clone()
	}

	fn pid_reads(&self) -> usize {
		self.calls.borrow().iter().filter(|&&c| c == "read_pid_block").count()
	}
}

impl FfbSource for Mock {
	type Packet = Packet;

	fn read_pid_block(&self, _device: DeviceId) -> Option<PidBlock> {
		let pid = self.pids.borrow_mut().pop_front();
		self.log("read_pid_block", pid)
	}

	fn header(&self, p: &Packet) -> Option<Header> { self.log("header", p.header) }
	fn packet_type(&self, p: &Packet) -> Option<u32> { self.log("packet_type", p.packet_type) }
	fn device_control(&self, p: &Packet) -> Option<u32> { self.log("device_control", p.device_control) }
	fn new_effect(&self, p: &Packet) -> Option<NewEffect> { self.log("new_effect", p.new_effect) }
	fn condition(&self, p: &Packet) -> Option<Condition> { self.log("condition", p.condition) }
	fn effect_report(&self, p: &Packet) -> Option<EffectReport> { self.log("effect_report", p.effect_report) }
	fn effect_operation(&self, p: &Packet) -> Option<EffectOperation> { self.log("effect_operation", p.effect_operation) }
	fn device_gain(&self, p: &Packet) -> Option<u8> { self.log("device_gain", p.device_gain) }
	fn envelope(&self, p: &Packet) -> Option<Envelope> { self.log("envelope", p.envelope) }
	fn periodic(&self, p: &Packet) -> Option<Periodic> { self.log("periodic", p.periodic) }
	fn ramp(&self, p: &Packet) -> Option<Ramp> { self.log("ramp", p.ramp) }
	fn constant(&self, p: &Packet) -> Option<Constant> { self.log("constant", p.constant) }
}

fn device(raw: u8) -> DeviceId {
	DeviceId::from_raw(raw).unwrap()
}

fn header(device_id: u8, block_index: u8) -> Option<Header> {
	Some(Header { device_id, block_index: Some(block_index) })
}

fn pid(next_free: u8, load_index: u8, status: LoadStatus) -> PidBlock {
	PidBlock {
		next_free_effect_id: next_free,
		last_effect_id: next_free.saturating_sub(1),
		block_load: BlockLoad {
			block_index: load_index,
			status: status.code(),
			ram_pool_available: 0xFFFF,
		},
	}
}

fn messages(lines: &[Diagnostic]) -> Vec<&str> {
	lines.iter().map(|l| l.message.as_str()).collect()
}

fn registered(mock: &Mock) -> FfbDecoder<&Mock> {
	let mut decoder = FfbDecoder::new(mock);
	decoder.register(device(1));
	decoder
}

#[test]
fn header_and_type_give_two_lines() {
	let mock = Mock::default();
	let mut decoder = registered(&mock);

	let lines = decoder.decode(&Packet {
		header: header(1, 2),
		packet_type: Some(PacketType::EffectReport.code()),
		..Packet::default()
	});

	assert_eq!(messages(&lines), ["Device ID: 1, Effect Block Index: 2", "Packet Type: Effect Report"]);
	assert!(lines.iter().all(|l| !l.is_warning()));
}

#[test]
fn every_extractor_is_attempted_in_order() {
	let mock = Mock::with_pids([PidBlock::default()]);
	let mut decoder = registered(&mock);
	mock.calls.borrow_mut().clear();

	assert!(decoder.decode(&Packet::default()).is_empty());
	assert_eq!(mock.calls(), [
		"header", "packet_type", "device_control", "new_effect", "condition", "effect_report",
		"effect_operation", "device_gain", "envelope", "periodic", "ramp", "constant",
	]);
}

#[test]
fn device_reset_rereads_pid_between_control_and_new_effect() {
	let mock = Mock::with_pids([pid(1, 0, LoadStatus::Success), pid(1, 0, LoadStatus::Success)]);
	let mut decoder = registered(&mock);
	mock.calls.borrow_mut().clear();

	let lines = decoder.decode(&Packet {
		header: Some(Header { device_id: 1, block_index: None }),
		packet_type: Some(PacketType::DeviceControl.code()),
		device_control: Some(ControlCommand::DeviceReset.code()),
		..Packet::default()
	});

	assert!(messages(&lines).contains(&"PID Device Control: Device Reset"));
	assert_eq!(mock.pid_reads(), 1);

	let calls = mock.calls();
	let read = calls.iter().position(|&c| c == "read_pid_block").unwrap();
	assert_eq!(calls[read - 1], "device_control");
	assert_eq!(calls[read + 1], "new_effect");
}

#[test]
fn other_control_commands_do_not_refresh() {
	let mock = Mock::with_pids([PidBlock::default()]);
	let mut decoder = registered(&mock);

	for command in ControlCommand::all().filter(|&c| c != ControlCommand::DeviceReset) {
		let lines = decoder.decode(&Packet {
			device_control: Some(command.code()),
			..Packet::default()
		});
		assert_eq!(messages(&lines), [format!("PID Device Control: {}", command)]);
	}

	assert_eq!(mock.pid_reads(), 1);
}

#[test]
fn new_effect_reports_type_id_and_load_status() {
	let mock = Mock::with_pids([PidBlock::default(), pid(4, 3, LoadStatus::Success)]);
	let mut decoder = registered(&mock);

	let lines = decoder.decode(&Packet {
		header: header(1, 3),
		packet_type: Some(PacketType::CreateNewEffect.code()),
		new_effect: Some(NewEffect { effect_type: EffectType::Sine.code(), block_index: 3 }),
		..Packet::default()
	});

	assert_eq!(messages(&lines), [
		"Device ID: 1, Effect Block Index: 3",
		"Packet Type: Create New Effect Report",
		"Effect Type: Sine",
		"New Effect ID: 3",
		"Load Status: Success",
	]);
	assert_eq!(decoder.pid_block().next_free_effect_id, 4);
}

#[test]
fn block_index_mismatch_warns_and_decoding_continues() {
	let mock = Mock::with_pids([PidBlock::default(), pid(6, 5, LoadStatus::Full)]);
	let mut decoder = registered(&mock);

	let lines = decoder.decode(&Packet {
		header: header(1, 2),
		new_effect: Some(NewEffect { effect_type: EffectType::Constant.code(), block_index: 2 }),
		constant: Some(Constant { block_index: 2, magnitude: SignedField::Word(0xFF38) }),
		..Packet::default()
	});

	let warning = lines.iter().find(|l| l.is_warning()).unwrap();
	assert!(warning.message.contains('2'));
	assert!(warning.message.contains('5'));

	let text = messages(&lines);
	assert!(text.contains(&"Load Status: Full"));
	assert!(text.contains(&"Constant Magnitude: -200"));
}

#[test]
fn failed_pid_read_keeps_previous_snapshot() {
	let before = pid(2, 1, LoadStatus::Success);
	let mock = Mock::with_pids([before]);
	let mut decoder = registered(&mock);

	let lines = decoder.decode(&Packet {
		header: header(1, 7),
		new_effect: Some(NewEffect { effect_type: EffectType::Spring.code(), block_index: 7 }),
		..Packet::default()
	});

	assert_eq!(decoder.pid_block(), &before);
	assert_eq!(lines.iter().filter(|l| l.is_warning()).count(), 1);
	assert!(!messages(&lines).iter().any(|l| l.starts_with("Load Status")));
	assert!(!messages(&lines).iter().any(|l| l.contains("does not match")));
}

#[test]
fn block_free_reports_next_free_id() {
	let mock = Mock::with_pids([PidBlock::default(), pid(9, 0, LoadStatus::Success)]);
	let mut decoder = registered(&mock);

	let lines = decoder.decode(&Packet {
		header: header(1, 4),
		packet_type: Some(PacketType::BlockFree.code()),
		..Packet::default()
	});

	assert_eq!(messages(&lines)[1], "Packet Type: PID Block Free Report, next free effect id 9");
}

#[test]
fn block_free_without_pid_stays_on_two_lines() {
	let mock = Mock::default();
	let mut decoder = FfbDecoder::new(&mock);

	let lines = decoder.decode(&Packet {
		header: header(1, 4),
		packet_type: Some(PacketType::BlockFree.code()),
		..Packet::default()
	});

	assert_eq!(lines.len(), 2);
	assert_eq!(lines[0].message, "Device ID: 1, Effect Block Index: 4");
	assert!(lines[1].is_warning());
	assert!(lines[1].message.starts_with("Packet Type: PID Block Free Report, PID block unavailable"));
	assert_eq!(mock.pid_reads(), 1);
}

#[test]
fn driver_handled_packets_are_marked() {
	let mock = Mock::default();
	let mut decoder = FfbDecoder::new(&mock);

	for ty in [PacketType::PoolReport, PacketType::BlockLoad] {
		let lines = decoder.decode(&Packet { packet_type: Some(ty.code()), ..Packet::default() });
		assert_eq!(messages(&lines), [format!("Packet Type: {} (handled by driver)", ty)]);
	}
}

#[test]
fn unknown_codes_are_warnings() {
	let mock = Mock::default();
	let mut decoder = FfbDecoder::new(&mock);

	let lines = decoder.decode(&Packet {
		packet_type: Some(0x09),
		device_control: Some(42),
		effect_operation: Some(EffectOperation { block_index: 1, operation: 7, loop_count: 1 }),
		..Packet::default()
	});

	assert_eq!(messages(&lines), [
		"Packet Type: Unknown(9)",
		"PID Device Control: Unknown(42)",
		"Effect Operation: Unknown(7)",
		"Loop 1 times",
	]);
	assert_eq!(lines.iter().filter(|l| l.is_warning()).count(), 3);
}

#[test]
fn effect_report_sentinels_and_scales() {
	let mock = Mock::default();
	let mut decoder = FfbDecoder::new(&mock);

	let lines = decoder.decode(&Packet {
		effect_report: Some(EffectReport {
			block_index: 1,
			effect_type: EffectType::Square.code(),
			axes_enabled_direction: 4,
			direction: Direction::Polar(16383),
			duration: 0xFFFF,
			trigger_repeat: 0xFFFF,
			sample_period: 0xFFFF,
			start_delay: 0xFFFF,
			gain: 0xFF,
			trigger_button: 0,
		}),
		..Packet::default()
	});

	assert_eq!(messages(&lines), [
		"Effect Report: Square",
		"Axes Enabled Direction: 4",
		"Direction: 179 deg (16383)",
		"Duration: infinite",
		"Trigger Repeat: infinite",
		"Sample Period: infinite",
		"Start Delay: max",
		"Gain: 100%",
	]);
}

#[test]
fn effect_report_with_cartesian_direction() {
	let mock = Mock::default();
	let mut decoder = FfbDecoder::new(&mock);

	let lines = decoder.decode(&Packet {
		effect_report: Some(EffectReport {
			effect_type: EffectType::None.code(),
			direction: Direction::Cartesian { x: 10, y: 20 },
			duration: 500,
			gain: 0x80,
			..EffectReport::default()
		}),
		..Packet::default()
	});

	let text = messages(&lines);
	assert_eq!(text[0], "Effect Report: Unknown(0)");
	assert!(lines[0].is_warning());
	assert!(text.contains(&"X Direction: 10"));
	assert!(text.contains(&"Y Direction: 20"));
	assert!(text.contains(&"Duration: 500 ms"));
	assert!(text.contains(&"Gain: 50%"));
}

#[test]
fn gain_loops_and_periodic() {
	let mock = Mock::default();
	let mut decoder = FfbDecoder::new(&mock);

	let lines = decoder.decode(&Packet {
		effect_operation: Some(EffectOperation { block_index: 1, operation: Operation::Start.code(), loop_count: 0xFF }),
		device_gain: Some(0x40),
		periodic: Some(Periodic {
			block_index: 1,
			magnitude: 5000,
			offset: SignedField::Word(0xFFFF),
			phase: 128,
			period: 100,
		}),
		..Packet::default()
	});

	assert_eq!(messages(&lines), [
		"Effect Operation: Effect Start",
		"Loop until stopped",
		"Global Device Gain: 25%",
		"Magnitude: 5000",
		"Offset: -1",
		"Phase: 180.7 deg",
		"Period: 100",
	]);
}

#[test]
fn condition_envelope_and_ramp() {
	let mock = Mock::default();
	let mut decoder = FfbDecoder::new(&mock);

	let lines = decoder.decode(&Packet {
		condition: Some(Condition {
			block_index: 1,
			is_y: true,
			center_point_offset: SignedField::Byte(0x80),
			positive_coefficient: SignedField::Word(1000),
			negative_coefficient: SignedField::Word(0xFC18),
			positive_saturation: 10000,
			negative_saturation: 10000,
			dead_band: 0,
		}),
		envelope: Some(Envelope { block_index: 1, attack_level: 1, fade_level: 2, attack_time: 3, fade_time: 4 }),
		ramp: Some(Ramp { block_index: 1, start: SignedField::Word(100), end: SignedField::Word(0xFF9C) }),
		..Packet::default()
	});

	assert_eq!(messages(&lines), [
		"Condition: Y Axis",
		"Center Point Offset: -128",
		"Positive Coefficient: 1000",
		"Negative Coefficient: -1000",
		"Positive Saturation: 10000",
		"Negative Saturation: 10000",
		"Dead Band: 0",
		"Attack Level: 1",
		"Fade Level: 2",
		"Attack Time: 3",
		"Fade Time: 4",
		"Ramp Start: 100",
		"Ramp End: -100",
	]);
}

#[test]
fn reregistration_rereads_pid() {
	let mock = Mock::with_pids([pid(1, 0, LoadStatus::Success), pid(3, 2, LoadStatus::Success)]);
	let mut decoder = FfbDecoder::new(&mock);

	assert!(decoder.register(device(1)));
	assert_eq!(decoder.pid_block().next_free_effect_id, 1);

	assert!(!decoder.register(device(2)));
	assert_eq!(decoder.pid_block().next_free_effect_id, 3);
	assert_eq!(decoder.device(), Some(device(2)));
	assert_eq!(mock.pid_reads(), 2);
}

#[test]
fn refresh_without_any_device_warns() {
	let mock = Mock::with_pids([pid(1, 0, LoadStatus::Success)]);
	let mut decoder = FfbDecoder::new(&mock);

	let lines = decoder.decode(&Packet {
		device_control: Some(ControlCommand::DeviceReset.code()),
		..Packet::default()
	});

	assert_eq!(lines.len(), 2);
	assert!(lines[1].is_warning());
	assert_eq!(mock.pid_reads(), 0);
}
