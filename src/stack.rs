use crate::constants::STACK_DEPTH;

/// # Call stack
/// Return addresses for subroutine calls, with `sp` pointing at the next free slot.
///
/// Pushing onto a full stack or popping from an empty one hands back `None` and leaves the
/// stack exactly as it was; the caller decides which fault that is.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CallStack {
    slots: [u16; STACK_DEPTH],
    sp: u8,
}

impl CallStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// stack[sp] = address; sp += 1
    pub fn push(&mut self, address: u16) -> Option<()> {
        let slot = self.slots.get_mut(self.sp as usize)?;
        *slot = address;
        self.sp += 1;
        Some(())
    }

    /// sp -= 1; stack[sp]
    pub fn pop(&mut self) -> Option<u16> {
        let sp = self.sp.checked_sub(1)?;
        self.sp = sp;
        Some(self.slots[sp as usize])
    }

    /// The most recently pushed return address
    pub fn top(&self) -> Option<u16> {
        let sp = self.sp.checked_sub(1)?;
        Some(self.slots[sp as usize])
    }

    pub fn pointer(&self) -> u8 {
        self.sp
    }

    pub fn is_empty(&self) -> bool {
        self.sp == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_then_pop() {
        let mut stack = CallStack::new();
        stack.push(0x200).unwrap();
        stack.push(0x300).unwrap();
        assert_eq!(stack.pointer(), 2);
        assert_eq!(stack.top(), Some(0x300));
        assert_eq!(stack.pop(), Some(0x300));
        assert_eq!(stack.pop(), Some(0x200));
        assert!(stack.is_empty());
    }

    #[test]
    fn test_pop_empty_underflows() {
        let mut stack = CallStack::new();
        assert_eq!(stack.pop(), None);
        assert_eq!(stack.pointer(), 0);
    }

    #[test]
    fn test_push_full_overflows_without_change() {
        let mut stack = CallStack::new();
        for address in 0..STACK_DEPTH as u16 {
            stack.push(address).unwrap();
        }
        let before = stack;
        assert_eq!(stack.push(0xFFF), None);
        assert_eq!(stack, before);
        assert_eq!(stack.pointer() as usize, STACK_DEPTH);
    }
}
