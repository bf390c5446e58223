use emu8::{Chip8, Fault, LoadError};
use rand::rngs::mock::StepRng;

fn machine(program: &[u8]) -> Chip8 {
    let mut chip8 = Chip8::with_rng(StepRng::new(0, 1));
    chip8.load_program(program).expect("program fits");
    chip8
}

fn run(chip8: &mut Chip8, steps: usize) {
    for _ in 0..steps {
        chip8.step().expect("no faults");
    }
}

#[test]
fn starts_at_0x200_with_everything_cleared() {
    let chip8 = Chip8::new();
    let state = chip8.state();
    assert_eq!(state.pc, 0x200);
    assert_eq!(state.v, [0; 16]);
    assert_eq!(state.stack.pointer(), 0);
    assert!(chip8.frame().iter().flatten().all(|&p| p == 0));
}

#[test]
fn call_and_return() {
    // 0x200 CALL 0x206
    // 0x202 LD V1, 0x02
    // 0x204 JP 0x204
    // 0x206 LD V0, 0x01
    // 0x208 RET
    let mut chip8 = machine(&[0x22, 0x06, 0x61, 0x02, 0x12, 0x04, 0x60, 0x01, 0x00, 0xEE]);
    chip8.step().unwrap();
    assert_eq!(chip8.state().pc, 0x206);
    assert_eq!(chip8.state().stack.pointer(), 1);
    assert_eq!(chip8.state().stack.top(), Some(0x200));
    run(&mut chip8, 2);
    assert_eq!(chip8.state().pc, 0x202);
    assert_eq!(chip8.state().stack.pointer(), 0);
    run(&mut chip8, 3);
    assert_eq!(chip8.state().v[0x0..2], [0x01, 0x02]);
    assert_eq!(chip8.state().pc, 0x204);
}

#[test]
fn drawing_a_glyph_twice_collides() {
    // LD V0, 0x0A; LD F, V0; DRW V1, V1, 5; DRW V1, V1, 5
    let mut chip8 = machine(&[0x60, 0x0A, 0xF0, 0x29, 0xD1, 0x15, 0xD1, 0x15]);
    run(&mut chip8, 3);
    assert_eq!(chip8.state().v[0xF], 0);
    let frame = chip8.take_frame().expect("drawing dirties the frame");
    // Top row of the A glyph
    assert_eq!(frame[0][0..4], [1, 1, 1, 1]);
    run(&mut chip8, 1);
    assert_eq!(chip8.state().v[0xF], 1);
    assert!(chip8.frame().iter().flatten().all(|&p| p == 0));
    assert!(chip8.is_dirty());
}

#[test]
fn counts_down_with_the_delay_timer() {
    // LD V0, 3; LD DT, V0; LD V1, DT; SE V1, 0; JP 0x204; JP 0x20A
    let mut chip8 = machine(&[
        0x60, 0x03, 0xF0, 0x15, 0xF1, 0x07, 0x31, 0x00, 0x12, 0x04, 0x12, 0x0A,
    ]);
    let mut cycles = 0;
    while chip8.state().pc != 0x20A {
        chip8.cycle().unwrap();
        cycles += 1;
        assert!(cycles < 100, "timer never reached zero");
    }
    assert_eq!(chip8.state().timers.delay, 0);
}

#[test]
fn waits_for_a_key_from_another_thread() {
    // LD V2, K; JP 0x202
    let mut chip8 = machine(&[0xF2, 0x0A, 0x12, 0x02]);
    let keypad = chip8.keypad();
    run(&mut chip8, 5);
    assert_eq!(chip8.state().pc, 0x200);

    std::thread::spawn(move || keypad.press(0x9)).join().unwrap();
    chip8.step().unwrap();
    assert_eq!(chip8.state().pc, 0x202);
    assert_eq!(chip8.state().v[0x2], 0x9);
}

#[test]
fn unknown_opcodes_do_not_stall() {
    let mut chip8 = machine(&[0x01, 0x23, 0x81, 0x2F, 0x60, 0x07]);
    assert!(matches!(
        chip8.step(),
        Err(Fault::UnknownOpcode { opcode: 0x0123, .. })
    ));
    assert!(matches!(
        chip8.step(),
        Err(Fault::UnknownOpcode { opcode: 0x812F, .. })
    ));
    chip8.step().unwrap();
    assert_eq!(chip8.state().v[0x0], 0x07);
}

#[test]
fn runaway_recursion_halts() {
    // CALL 0x200 forever
    let mut chip8 = machine(&[0x22, 0x00]);
    run(&mut chip8, 16);
    assert_eq!(
        chip8.step(),
        Err(Fault::StackOverflow { address: 0x200 })
    );
    assert_eq!(chip8.step(), Err(Fault::Halted));
    assert_eq!(chip8.state().stack.pointer(), 16);
}

#[test]
fn oversized_program_is_rejected() {
    let mut chip8 = Chip8::new();
    let result = chip8.load_program(&vec![0; 3585]);
    assert!(matches!(result, Err(LoadError::TooLarge { size: 3585 })));
    assert!(chip8.state().memory.as_bytes()[0x200..]
        .iter()
        .all(|&b| b == 0));
}

#[test]
fn random_bytes_come_from_the_supplied_rng() {
    // RND V0, 0xFF twice
    let mut chip8 = Chip8::with_rng(StepRng::new(0x10, 0x01));
    chip8.load_program(&[0xC0, 0xFF, 0xC1, 0xFF]).unwrap();
    run(&mut chip8, 2);
    assert_eq!(chip8.state().v[0x0..2], [0x10, 0x11]);
}
