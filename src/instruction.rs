use std::fmt;

use crate::opcode::Opcode;

/// # Instructions
/// Every instruction in the Chip-8 instruction set, decoded from its `Opcode`.
///
/// `x` and `y` name registers (Vx, Vy), `nn` is an immediate byte, `n` an immediate nibble and
/// `addr` a 12-bit address.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// `00E0` clear the screen
    Cls,
    /// `00EE` return from a subroutine
    Ret,
    /// `1NNN` PC = addr
    Jump { addr: u16 },
    /// `2NNN` call the subroutine at addr
    Call { addr: u16 },
    /// `3XNN` skip if Vx == nn
    SkipEqByte { x: u8, nn: u8 },
    /// `4XNN` skip if Vx != nn
    SkipNeByte { x: u8, nn: u8 },
    /// `5XY0` skip if Vx == Vy
    SkipEqReg { x: u8, y: u8 },
    /// `6XNN` Vx = nn
    LoadByte { x: u8, nn: u8 },
    /// `7XNN` Vx += nn, without touching VF
    AddByte { x: u8, nn: u8 },
    /// `8XY0` Vx = Vy
    Move { x: u8, y: u8 },
    /// `8XY1` Vx |= Vy
    Or { x: u8, y: u8 },
    /// `8XY2` Vx &= Vy
    And { x: u8, y: u8 },
    /// `8XY3` Vx ^= Vy
    Xor { x: u8, y: u8 },
    /// `8XY4` Vx += Vy; VF = carry
    AddReg { x: u8, y: u8 },
    /// `8XY5` Vx -= Vy; VF = !borrow
    Sub { x: u8, y: u8 },
    /// `8XY6` Vx >>= 1; VF = the bit shifted out
    ShiftRight { x: u8, y: u8 },
    /// `8XY7` Vx = Vy - Vx; VF = !borrow
    SubN { x: u8, y: u8 },
    /// `8XYE` Vx <<= 1; VF = the bit shifted out
    ShiftLeft { x: u8, y: u8 },
    /// `9XY0` skip if Vx != Vy
    SkipNeReg { x: u8, y: u8 },
    /// `ANNN` I = addr
    LoadIndex { addr: u16 },
    /// `BNNN` PC = addr + V0
    JumpOffset { addr: u16 },
    /// `CXNN` Vx = random & nn
    Random { x: u8, nn: u8 },
    /// `DXYN` draw an n row sprite from memory[I..] at (Vx, Vy); VF = collision
    Draw { x: u8, y: u8, n: u8 },
    /// `EX9E` skip if the key in Vx is pressed
    SkipPressed { x: u8 },
    /// `EXA1` skip if the key in Vx isn't pressed
    SkipNotPressed { x: u8 },
    /// `FX07` Vx = delay timer
    LoadDelay { x: u8 },
    /// `FX0A` wait for a key press and put it in Vx
    WaitKey { x: u8 },
    /// `FX15` delay timer = Vx
    SetDelay { x: u8 },
    /// `FX18` sound timer = Vx
    SetSound { x: u8 },
    /// `FX1E` I += Vx; VF = I overflowed the address space
    AddIndex { x: u8 },
    /// `FX29` I = address of the font glyph for Vx
    LoadGlyph { x: u8 },
    /// `FX33` memory[I..I+3] = decimal digits of Vx
    StoreBcd { x: u8 },
    /// `FX55` memory[I..=I+x] = V0..=Vx
    StoreRegisters { x: u8 },
    /// `FX65` V0..=Vx = memory[I..=I+x]
    LoadRegisters { x: u8 },
}

impl Instruction {
    /// Selects the correct Instruction for a given Opcode.
    ///
    /// Dispatches on the most significant nibble first; the 0, 8, E and F families share that
    /// nibble between several instructions and are told apart by their low nibble or byte.
    /// Returns `None` for an opcode that isn't part of the instruction set.
    pub fn decode(op: Opcode) -> Option<Self> {
        use Instruction::*;

        let (x, y, n, nn, addr) = (op.x(), op.y(), op.n(), op.nn(), op.nnn());
        let instruction = match op.family() {
            0x0 => match addr {
                0x0E0 => Cls,
                0x0EE => Ret,
                _ => return None,
            },
            0x1 => Jump { addr },
            0x2 => Call { addr },
            0x3 => SkipEqByte { x, nn },
            0x4 => SkipNeByte { x, nn },
            0x5 if n == 0x0 => SkipEqReg { x, y },
            0x6 => LoadByte { x, nn },
            0x7 => AddByte { x, nn },
            0x8 => match n {
                0x0 => Move { x, y },
                0x1 => Or { x, y },
                0x2 => And { x, y },
                0x3 => Xor { x, y },
                0x4 => AddReg { x, y },
                0x5 => Sub { x, y },
                0x6 => ShiftRight { x, y },
                0x7 => SubN { x, y },
                0xE => ShiftLeft { x, y },
                _ => return None,
            },
            0x9 if n == 0x0 => SkipNeReg { x, y },
            0xA => LoadIndex { addr },
            0xB => JumpOffset { addr },
            0xC => Random { x, nn },
            0xD => Draw { x, y, n },
            0xE => match nn {
                0x9E => SkipPressed { x },
                0xA1 => SkipNotPressed { x },
                _ => return None,
            },
            0xF => match nn {
                0x07 => LoadDelay { x },
                0x0A => WaitKey { x },
                0x15 => SetDelay { x },
                0x18 => SetSound { x },
                0x1E => AddIndex { x },
                0x29 => LoadGlyph { x },
                0x33 => StoreBcd { x },
                0x55 => StoreRegisters { x },
                0x65 => LoadRegisters { x },
                _ => return None,
            },
            _ => return None,
        };
        Some(instruction)
    }

    /// The Opcode this Instruction was decoded from.
    pub fn encode(&self) -> Opcode {
        use Instruction::*;

        let xy = |family: u16, x: u8, y: u8, n: u16| {
            family << 12 | u16::from(x) << 8 | u16::from(y) << 4 | n
        };
        let xnn = |family: u16, x: u8, nn: u8| family << 12 | u16::from(x) << 8 | u16::from(nn);

        Opcode(match *self {
            Cls => 0x00E0,
            Ret => 0x00EE,
            Jump { addr } => 0x1000 | addr,
            Call { addr } => 0x2000 | addr,
            SkipEqByte { x, nn } => xnn(0x3, x, nn),
            SkipNeByte { x, nn } => xnn(0x4, x, nn),
            SkipEqReg { x, y } => xy(0x5, x, y, 0x0),
            LoadByte { x, nn } => xnn(0x6, x, nn),
            AddByte { x, nn } => xnn(0x7, x, nn),
            Move { x, y } => xy(0x8, x, y, 0x0),
            Or { x, y } => xy(0x8, x, y, 0x1),
            And { x, y } => xy(0x8, x, y, 0x2),
            Xor { x, y } => xy(0x8, x, y, 0x3),
            AddReg { x, y } => xy(0x8, x, y, 0x4),
            Sub { x, y } => xy(0x8, x, y, 0x5),
            ShiftRight { x, y } => xy(0x8, x, y, 0x6),
            SubN { x, y } => xy(0x8, x, y, 0x7),
            ShiftLeft { x, y } => xy(0x8, x, y, 0xE),
            SkipNeReg { x, y } => xy(0x9, x, y, 0x0),
            LoadIndex { addr } => 0xA000 | addr,
            JumpOffset { addr } => 0xB000 | addr,
            Random { x, nn } => xnn(0xC, x, nn),
            Draw { x, y, n } => xy(0xD, x, y, u16::from(n)),
            SkipPressed { x } => xnn(0xE, x, 0x9E),
            SkipNotPressed { x } => xnn(0xE, x, 0xA1),
            LoadDelay { x } => xnn(0xF, x, 0x07),
            WaitKey { x } => xnn(0xF, x, 0x0A),
            SetDelay { x } => xnn(0xF, x, 0x15),
            SetSound { x } => xnn(0xF, x, 0x18),
            AddIndex { x } => xnn(0xF, x, 0x1E),
            LoadGlyph { x } => xnn(0xF, x, 0x29),
            StoreBcd { x } => xnn(0xF, x, 0x33),
            StoreRegisters { x } => xnn(0xF, x, 0x55),
            LoadRegisters { x } => xnn(0xF, x, 0x65),
        })
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;

        match *self {
            Cls => write!(f, "CLS"),
            Ret => write!(f, "RET"),
            Jump { addr } => write!(f, "JP {:#05X}", addr),
            Call { addr } => write!(f, "CALL {:#05X}", addr),
            SkipEqByte { x, nn } => write!(f, "SE V{:X}, {:#04X}", x, nn),
            SkipNeByte { x, nn } => write!(f, "SNE V{:X}, {:#04X}", x, nn),
            SkipEqReg { x, y } => write!(f, "SE V{:X}, V{:X}", x, y),
            LoadByte { x, nn } => write!(f, "LD V{:X}, {:#04X}", x, nn),
            AddByte { x, nn } => write!(f, "ADD V{:X}, {:#04X}", x, nn),
            Move { x, y } => write!(f, "LD V{:X}, V{:X}", x, y),
            Or { x, y } => write!(f, "OR V{:X}, V{:X}", x, y),
            And { x, y } => write!(f, "AND V{:X}, V{:X}", x, y),
            Xor { x, y } => write!(f, "XOR V{:X}, V{:X}", x, y),
            AddReg { x, y } => write!(f, "ADD V{:X}, V{:X}", x, y),
            Sub { x, y } => write!(f, "SUB V{:X}, V{:X}", x, y),
            ShiftRight { x, .. } => write!(f, "SHR V{:X}", x),
            SubN { x, y } => write!(f, "SUBN V{:X}, V{:X}", x, y),
            ShiftLeft { x, .. } => write!(f, "SHL V{:X}", x),
            SkipNeReg { x, y } => write!(f, "SNE V{:X}, V{:X}", x, y),
            LoadIndex { addr } => write!(f, "LD I, {:#05X}", addr),
            JumpOffset { addr } => write!(f, "JP V0, {:#05X}", addr),
            Random { x, nn } => write!(f, "RND V{:X}, {:#04X}", x, nn),
            Draw { x, y, n } => write!(f, "DRW V{:X}, V{:X}, {}", x, y, n),
            SkipPressed { x } => write!(f, "SKP V{:X}", x),
            SkipNotPressed { x } => write!(f, "SKNP V{:X}", x),
            LoadDelay { x } => write!(f, "LD V{:X}, DT", x),
            WaitKey { x } => write!(f, "LD V{:X}, K", x),
            SetDelay { x } => write!(f, "LD DT, V{:X}", x),
            SetSound { x } => write!(f, "LD ST, V{:X}", x),
            AddIndex { x } => write!(f, "ADD I, V{:X}", x),
            LoadGlyph { x } => write!(f, "LD F, V{:X}", x),
            StoreBcd { x } => write!(f, "LD B, V{:X}", x),
            StoreRegisters { x } => write!(f, "LD [I], V{:X}", x),
            LoadRegisters { x } => write!(f, "LD V{:X}, [I]", x),
        }
    }
}

/// Lists a program image one opcode per line, starting at `origin`.
///
/// Unknown opcodes are shown as raw data; a trailing odd byte is shown on its own.
pub fn disassemble(program: &[u8], origin: u16) -> Vec<String> {
    program
        .chunks(2)
        .enumerate()
        .map(|(index, chunk)| {
            let address = origin.wrapping_add(2 * index as u16);
            match chunk {
                &[high, low] => {
                    let op = Opcode::from_bytes(high, low);
                    match Instruction::decode(op) {
                        Some(instruction) => format!("{:#05X}  {}  {}", address, op, instruction),
                        None => format!("{:#05X}  {}  DW {:#06X}", address, op, op.0),
                    }
                }
                _ => format!("{:#05X}  {:02X}    DB {:#04X}", address, chunk[0], chunk[0]),
            }
        })
        .collect()
}
