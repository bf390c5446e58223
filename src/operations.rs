use rand::RngCore;

use crate::constants::{FONT_START, GLYPH_HEIGHT, MAX_ADDRESS};
use crate::error::Fault;
use crate::instruction::Instruction;
use crate::keypad::Keypad;
use crate::state::State;

/// What an instruction can reach besides the machine state
pub struct Peripherals<'a> {
    pub keypad: &'a Keypad,
    pub rng: &'a mut dyn RngCore,
}

type Outcome = Result<(), Fault>;

/// Executes a decoded Instruction against `state`.
///
/// On success the program counter points at the next instruction to fetch. On a fault nothing
/// in `state` has been changed.
pub fn execute(instruction: Instruction, state: &mut State, io: &mut Peripherals<'_>) -> Outcome {
    use Instruction::*;

    match instruction {
        Cls => clr(state),
        Ret => rts(state),
        Jump { addr } => jump(state, addr),
        Call { addr } => call(state, addr),
        SkipEqByte { x, nn } => skip_if(state.vx(x) == nn, state),
        SkipNeByte { x, nn } => skip_if(state.vx(x) != nn, state),
        SkipEqReg { x, y } => skip_if(state.vx(x) == state.vx(y), state),
        LoadByte { x, nn } => load(state, x, nn),
        AddByte { x, nn } => add(state, x, nn),
        Move { x, y } => alu(state, x, y, |_, vy| (vy, None)),
        Or { x, y } => alu(state, x, y, |vx, vy| (vx | vy, None)),
        And { x, y } => alu(state, x, y, |vx, vy| (vx & vy, None)),
        Xor { x, y } => alu(state, x, y, |vx, vy| (vx ^ vy, None)),
        AddReg { x, y } => alu(state, x, y, addr),
        Sub { x, y } => alu(state, x, y, sub),
        ShiftRight { x, y } => alu(state, x, y, shr),
        SubN { x, y } => alu(state, x, y, subn),
        ShiftLeft { x, y } => alu(state, x, y, shl),
        SkipNeReg { x, y } => skip_if(state.vx(x) != state.vx(y), state),
        LoadIndex { addr } => loadi(state, addr),
        JumpOffset { addr } => jumpi(state, addr),
        Random { x, nn } => rnd(state, x, nn, io.rng),
        Draw { x, y, n } => draw(state, x, y, n),
        SkipPressed { x } => skip_if(io.keypad.is_pressed(state.vx(x)), state),
        SkipNotPressed { x } => skip_if(!io.keypad.is_pressed(state.vx(x)), state),
        LoadDelay { x } => moved(state, x),
        WaitKey { x } => keyd(state, x, io.keypad),
        SetDelay { x } => loads(state, x),
        SetSound { x } => ld(state, x),
        AddIndex { x } => addi(state, x),
        LoadGlyph { x } => ldspr(state, x),
        StoreBcd { x } => bcd(state, x),
        StoreRegisters { x } => stor(state, x),
        LoadRegisters { x } => read(state, x),
    }
}

fn next(state: &mut State) -> Outcome {
    state.pc += 0x2;
    Ok(())
}

/// if cond then pc += 2
fn skip_if(cond: bool, state: &mut State) -> Outcome {
    state.pc += if cond { 0x4 } else { 0x2 };
    Ok(())
}

/// clear
fn clr(state: &mut State) -> Outcome {
    state.frame_buffer.clear();
    next(state)
}

/// PC = STACK.pop()
fn rts(state: &mut State) -> Outcome {
    let address = state.pc;
    let ret = state
        .stack
        .pop()
        .ok_or(Fault::StackUnderflow { address })?;
    state.pc = ret;
    next(state)
}

/// PC = addr
fn jump(state: &mut State, addr: u16) -> Outcome {
    state.pc = addr;
    Ok(())
}

/// STACK.push(PC); PC = addr
fn call(state: &mut State, addr: u16) -> Outcome {
    let address = state.pc;
    state
        .stack
        .push(address)
        .ok_or(Fault::StackOverflow { address })?;
    state.pc = addr;
    Ok(())
}

/// Vx = nn
fn load(state: &mut State, x: u8, nn: u8) -> Outcome {
    state.set_vx(x, nn);
    next(state)
}

/// Vx += nn
/// Add nn to Vx; allow for overflow but implicitly drop it
fn add(state: &mut State, x: u8, nn: u8) -> Outcome {
    state.set_vx(x, state.vx(x).wrapping_add(nn));
    next(state)
}

/// Vx = op(Vx, Vy); VF = flag if the op produces one
///
/// The flag is written after the result so that when x is F the flag wins.
fn alu(state: &mut State, x: u8, y: u8, op: impl Fn(u8, u8) -> (u8, Option<bool>)) -> Outcome {
    let (result, flag) = op(state.vx(x), state.vx(y));
    state.set_vx(x, result);
    if let Some(flag) = flag {
        state.set_flag(flag);
    }
    next(state)
}

/// Vx + Vy; VF = overflow
fn addr(vx: u8, vy: u8) -> (u8, Option<bool>) {
    let (res, over) = vx.overflowing_add(vy);
    (res, Some(over))
}

/// Vx - Vy; VF = !underflow
fn sub(vx: u8, vy: u8) -> (u8, Option<bool>) {
    (vx.wrapping_sub(vy), Some(vy <= vx))
}

/// Vx / 2; VF = underflow
fn shr(vx: u8, _vy: u8) -> (u8, Option<bool>) {
    (vx >> 1, Some(vx & 0x1 == 0x1))
}

/// Vy - Vx; VF = !underflow
fn subn(vx: u8, vy: u8) -> (u8, Option<bool>) {
    (vy.wrapping_sub(vx), Some(vx <= vy))
}

/// Vx * 2; VF = overflow
fn shl(vx: u8, _vy: u8) -> (u8, Option<bool>) {
    (vx << 1, Some(vx & 0x80 == 0x80))
}

/// I = addr
fn loadi(state: &mut State, addr: u16) -> Outcome {
    state.i = addr;
    next(state)
}

/// PC = V0 + addr
fn jumpi(state: &mut State, addr: u16) -> Outcome {
    state.pc = addr + u16::from(state.v[0x0]);
    Ok(())
}

/// Vx = rand_byte & nn
fn rnd(state: &mut State, x: u8, nn: u8, rng: &mut dyn RngCore) -> Outcome {
    let rand_byte = rng.next_u32() as u8;
    state.set_vx(x, rand_byte & nn);
    next(state)
}

/// draw_sprite(x=Vx y=Vy size=n)
/// XORs a sprite from memory i..i+n at position x, y on the FrameBuffer with wrapping.
/// Sets VF if any pixels were erased
fn draw(state: &mut State, x: u8, y: u8, n: u8) -> Outcome {
    let (x, y) = (state.vx(x) as usize, state.vx(y) as usize);
    let rows = state.memory.slice(state.i, n as usize)?;
    let collision = state.frame_buffer.draw_sprite(x, y, rows);
    state.set_flag(collision);
    next(state)
}

/// Vx = DT
fn moved(state: &mut State, x: u8) -> Outcome {
    state.set_vx(x, state.timers.delay);
    next(state)
}

/// await keypress for Vx
/// Leaves the pc alone until a key is down so that this instruction runs again next cycle
fn keyd(state: &mut State, x: u8, keypad: &Keypad) -> Outcome {
    match keypad.first_pressed() {
        Some(key) => {
            state.set_vx(x, key);
            next(state)
        }
        None => Ok(()),
    }
}

/// DT = Vx
fn loads(state: &mut State, x: u8) -> Outcome {
    state.timers.delay = state.vx(x);
    next(state)
}

/// ST = Vx
fn ld(state: &mut State, x: u8) -> Outcome {
    state.timers.sound = state.vx(x);
    next(state)
}

/// I += Vx; VF = I > 0xFFF
fn addi(state: &mut State, x: u8) -> Outcome {
    let sum = state.i.wrapping_add(u16::from(state.vx(x)));
    state.i = sum;
    state.set_flag(sum > MAX_ADDRESS || sum < u16::from(state.vx(x)));
    next(state)
}

/// I = Vx * 5
/// Set I to the memory address of the font glyph for Vx
fn ldspr(state: &mut State, x: u8) -> Outcome {
    state.i = FONT_START + u16::from(state.vx(x)) * GLYPH_HEIGHT;
    next(state)
}

/// mem[I..I+3] = bcd(Vx)
/// Store BCD repr of Vx in memory starting at address i
fn bcd(state: &mut State, x: u8) -> Outcome {
    let vx = state.vx(x);
    let bcd = [vx / 100 % 10, vx / 10 % 10, vx % 10];
    state.memory.write_slice(state.i, &bcd)?;
    next(state)
}

/// mem[I..=I+x] = V0..=Vx
fn stor(state: &mut State, x: u8) -> Outcome {
    state
        .memory
        .write_slice(state.i, &state.v[0x0..=x as usize])?;
    next(state)
}

/// V0..=Vx = mem[I..=I+x]
fn read(state: &mut State, x: u8) -> Outcome {
    let bytes = state.memory.slice(state.i, x as usize + 1)?;
    state.v[0x0..=x as usize].copy_from_slice(bytes);
    next(state)
}
