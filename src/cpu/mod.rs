// CPU module - 6502 processor implementation
// This module will contain the 6502 CPU emulation

// Sub-modules
pub mod addressing;
pub mod execute;
pub mod instructions;
pub mod opcodes;

/// Processor Status Flags (P register)
///
/// Bit layout:
/// ```text
/// 7  6  5  4  3  2  1  0
/// N  V  -  B  D  I  Z  C
/// ```
///
/// - N: Negative flag (bit 7)
/// - V: Overflow flag (bit 6)
/// - -: Unused flag (bit 5, always 1)
/// - B: Break command flag (bit 4)
/// - D: Decimal mode flag (bit 3, unused in NES)
/// - I: Interrupt disable flag (bit 2)
/// - Z: Zero flag (bit 1)
/// - C: Carry flag (bit 0)
pub mod flags {
    pub const CARRY: u8 = 0b0000_0001; // Bit 0: C
    pub const ZERO: u8 = 0b0000_0010; // Bit 1: Z
    pub const INTERRUPT_DISABLE: u8 = 0b0000_0100; // Bit 2: I
    pub const DECIMAL: u8 = 0b0000_1000; // Bit 3: D (unused in NES)
    pub const BREAK: u8 = 0b0001_0000; // Bit 4: B
    pub const UNUSED: u8 = 0b0010_0000; // Bit 5: - (always 1)
    pub const OVERFLOW: u8 = 0b0100_0000; // Bit 6: V
    pub const NEGATIVE: u8 = 0b1000_0000; // Bit 7: N
}

/// Interrupt Vector Addresses
///
/// The 6502 CPU uses fixed memory addresses to determine where to jump
/// when an interrupt occurs. These vectors are located at the top of the
/// address space.
pub mod vectors {
    /// NMI (Non-Maskable Interrupt) vector address ($FFFA-$FFFB)
    /// NMI is triggered by the PPU at the start of VBlank and cannot be disabled
    pub const NMI: u16 = 0xFFFA;

    /// RESET vector address ($FFFC-$FFFD)
    /// RESET is triggered when the system starts or is reset
    pub const RESET: u16 = 0xFFFC;

    /// IRQ/BRK vector address ($FFFE-$FFFF)
    /// IRQ is triggered by external hardware and can be disabled by the I flag
    /// BRK (software interrupt) also uses this vector
    pub const IRQ: u16 = 0xFFFE;
}

/// CPU structure representing the 6502 processor state
pub struct Cpu {
    // Registers
    pub a: u8,      // Accumulator
    pub x: u8,      // Index Register X
    pub y: u8,      // Index Register Y
    pub sp: u8,     // Stack Pointer
    pub pc: u16,    // Program Counter
    pub status: u8, // Processor Status flags

    // Cycle counter
    pub cycles: u64, // Total number of cycles executed

    /// Cycles remaining until the next instruction fetch. `step` decrements
    /// this once per call; when it reaches 0, `step` fetches and executes
    /// the next instruction and recharges it with that instruction's total
    /// cost (base + page-crossing + branch/add-on cycles). This is what
    /// makes one `step()` call correspond to one real CPU clock cycle
    /// rather than one whole instruction, so callers that dispatch `step`
    /// at a fixed tick rate (the master-clock scheduler) see instructions
    /// take their real cycle count instead of all costing the same.
    pub wait_cycles: u16,

    /// Cycles remaining before the CPU resumes fetching instructions.
    /// Charged by OAM DMA (513/514 cycles); `step` decrements this and
    /// returns early instead of fetching while it's nonzero.
    pub stall: u16,

    /// Set by the KIL/JAM/STP illegal opcode family, which locks the 6502
    /// up until a hardware reset. `step` becomes a no-op once this is true.
    pub halted: bool,
}

impl Cpu {
    /// Create a new CPU instance with default values
    ///
    /// Initializes the CPU to the power-on state according to 6502 specifications:
    /// - All registers (A, X, Y) are set to 0
    /// - Stack pointer (SP) is set to 0xFD
    /// - Program counter (PC) is set to 0 (should be loaded from reset vector $FFFC-$FFFD)
    /// - Status flags:
    ///   - Unused flag (bit 5) is always set to 1
    ///   - Interrupt Disable flag (I) is set to 1
    ///   - All other flags are cleared
    pub fn new() -> Self {
        let mut cpu = Cpu {
            a: 0,
            x: 0,
            y: 0,
            sp: 0xFD,
            pc: 0,
            status: 0,
            cycles: 0,
            wait_cycles: 0,
            stall: 0,
            halted: false,
        };

        // Initialize status register with required flags
        // The UNUSED flag must always be 1
        cpu.set_flag(flags::UNUSED);
        cpu.set_flag(flags::INTERRUPT_DISABLE);

        cpu
    }

    /// Reset the CPU to initial state
    ///
    /// This simulates the RESET signal on the 6502 processor.
    /// According to 6502 specifications:
    /// - A, X, Y registers are not affected (but we clear them for consistency)
    /// - SP is decremented by 3 (but we set it to 0xFD as standard practice)
    /// - Interrupt Disable flag is set
    /// - PC is loaded from reset vector at $FFFC-$FFFD
    /// - UNUSED flag must remain set
    /// - `wait_cycles` is set to 7, so the first instruction does not fetch
    ///   until 7 calls to `step` have drained it
    ///
    /// # Arguments
    /// * `bus` - The memory bus for reading the RESET vector
    ///
    /// # Implementation Note
    /// Unlike NMI and IRQ, RESET does not push any values to the stack.
    /// It simply initializes the CPU state and loads the program counter
    /// from the RESET vector.
    pub fn reset(&mut self, bus: &mut crate::bus::Bus) {
        self.a = 0;
        self.x = 0;
        self.y = 0;
        self.sp = 0xFD;
        self.cycles = 0;
        self.stall = 0;
        self.halted = false;
        self.wait_cycles = 0;

        // Clear all flags except UNUSED (which must always be 1)
        self.status = 0;
        self.set_flag(flags::UNUSED);
        self.set_flag(flags::INTERRUPT_DISABLE);

        // Load PC from RESET vector ($FFFC-$FFFD)
        let lo = bus.read(vectors::RESET) as u16;
        let hi = bus.read(vectors::RESET.wrapping_add(1)) as u16;
        self.pc = (hi << 8) | lo;

        // RESET holds the CPU for 7 cycles before it fetches its first
        // instruction; charge that delay to wait_cycles rather than
        // fast-forwarding the monotonic cycle counter.
        self.wait_cycles = 7;
    }

    // ========================================
    // Status Flag Manipulation Methods
    // ========================================

    /// Get the value of a specific flag
    #[inline]
    pub fn get_flag(&self, flag: u8) -> bool {
        (self.status & flag) != 0
    }

    /// Set a specific flag to 1
    #[inline]
    pub fn set_flag(&mut self, flag: u8) {
        self.status |= flag;
    }

    /// Clear a specific flag (set to 0)
    #[inline]
    pub fn clear_flag(&mut self, flag: u8) {
        self.status &= !flag;
    }

    /// Update a flag based on a condition
    #[inline]
    pub fn update_flag(&mut self, flag: u8, condition: bool) {
        if condition {
            self.set_flag(flag);
        } else {
            self.clear_flag(flag);
        }
    }

    // ========================================
    // Individual Flag Getters
    // ========================================

    /// Get Carry flag (C)
    #[inline]
    pub fn get_carry(&self) -> bool {
        self.get_flag(flags::CARRY)
    }

    /// Get Zero flag (Z)
    #[inline]
    pub fn get_zero(&self) -> bool {
        self.get_flag(flags::ZERO)
    }

    /// Get Interrupt Disable flag (I)
    #[inline]
    pub fn get_interrupt_disable(&self) -> bool {
        self.get_flag(flags::INTERRUPT_DISABLE)
    }

    /// Get Decimal mode flag (D) - unused in NES
    #[inline]
    pub fn get_decimal(&self) -> bool {
        self.get_flag(flags::DECIMAL)
    }

    /// Get Break flag (B)
    #[inline]
    pub fn get_break(&self) -> bool {
        self.get_flag(flags::BREAK)
    }

    /// Get Overflow flag (V)
    #[inline]
    pub fn get_overflow(&self) -> bool {
        self.get_flag(flags::OVERFLOW)
    }

    /// Get Negative flag (N)
    #[inline]
    pub fn get_negative(&self) -> bool {
        self.get_flag(flags::NEGATIVE)
    }

    // ========================================
    // Individual Flag Setters
    // ========================================

    /// Set Carry flag (C)
    #[inline]
    pub fn set_carry(&mut self, value: bool) {
        self.update_flag(flags::CARRY, value);
    }

    /// Set Zero flag (Z)
    #[inline]
    pub fn set_zero(&mut self, value: bool) {
        self.update_flag(flags::ZERO, value);
    }

    /// Set Interrupt Disable flag (I)
    #[inline]
    pub fn set_interrupt_disable(&mut self, value: bool) {
        self.update_flag(flags::INTERRUPT_DISABLE, value);
    }

    /// Set Decimal mode flag (D) - unused in NES
    #[inline]
    pub fn set_decimal(&mut self, value: bool) {
        self.update_flag(flags::DECIMAL, value);
    }

    /// Set Break flag (B)
    #[inline]
    pub fn set_break(&mut self, value: bool) {
        self.update_flag(flags::BREAK, value);
    }

    /// Set Overflow flag (V)
    #[inline]
    pub fn set_overflow(&mut self, value: bool) {
        self.update_flag(flags::OVERFLOW, value);
    }

    /// Set Negative flag (N)
    #[inline]
    pub fn set_negative(&mut self, value: bool) {
        self.update_flag(flags::NEGATIVE, value);
    }

    // ========================================
    // Common Flag Update Patterns
    // ========================================

    /// Update Zero and Negative flags based on a value
    /// This is a common pattern after load and arithmetic operations
    #[inline]
    pub fn update_zero_and_negative_flags(&mut self, value: u8) {
        self.set_zero(value == 0);
        self.set_negative((value & 0x80) != 0);
    }

    // ========================================
    // Interrupt Handling Methods
    // ========================================

    /// Trigger an NMI (Non-Maskable Interrupt)
    ///
    /// NMI is typically triggered by the PPU at the start of VBlank.
    /// Unlike IRQ, NMI cannot be disabled by the Interrupt Disable flag.
    ///
    /// Operation:
    /// 1. Push PC high byte to stack
    /// 2. Push PC low byte to stack
    /// 3. Push status flags with B flag clear to stack
    /// 4. Set I (Interrupt Disable) flag
    /// 5. Load PC from NMI vector at $FFFA-$FFFB
    ///
    /// # Arguments
    /// * `bus` - The memory bus for stack operations and reading NMI vector
    ///
    /// # Implementation Note
    /// - The B flag is pushed as 0 (unlike BRK which pushes it as 1)
    /// - The I flag is set after the interrupt to prevent further IRQs
    /// - NMI cannot be disabled by the I flag
    pub fn nmi(&mut self, bus: &mut crate::bus::Bus) {
        // Push PC to stack (high byte first, then low byte)
        self.stack_push_u16(bus, self.pc);

        // Push status flags with B flag clear and UNUSED flag set
        // NMI pushes status with B=0 (to distinguish from BRK which pushes B=1)
        let status_to_push = (self.status & !flags::BREAK) | flags::UNUSED;
        self.stack_push(bus, status_to_push);

        // Set the Interrupt Disable flag
        self.set_interrupt_disable(true);

        // Load PC from NMI vector ($FFFA-$FFFB)
        let lo = bus.read(vectors::NMI) as u16;
        let hi = bus.read(vectors::NMI.wrapping_add(1)) as u16;
        self.pc = (hi << 8) | lo;
    }

    /// Trigger an IRQ (Interrupt Request)
    ///
    /// IRQ is triggered by external hardware (e.g., cartridge mappers, APU).
    /// IRQ can be disabled by setting the Interrupt Disable flag (I).
    /// If the I flag is set, this method returns immediately without any state changes.
    ///
    /// Operation:
    /// 1. Check if I flag is set; if so, return immediately (IRQ is masked)
    /// 2. Push PC high byte to stack
    /// 3. Push PC low byte to stack
    /// 4. Push status flags with B flag clear to stack
    /// 5. Set I (Interrupt Disable) flag
    /// 6. Load PC from IRQ vector at $FFFE-$FFFF
    ///
    /// # Arguments
    /// * `bus` - The memory bus for stack operations and reading IRQ vector
    ///
    /// # Implementation Note
    /// - The I flag is checked internally; IRQ is ignored when I=1 (maskable interrupt)
    /// - The B flag is pushed as 0 (same as NMI)
    /// - Shares the same vector as BRK ($FFFE-$FFFF)
    /// - The I flag is set after the interrupt to prevent nested IRQs
    pub fn irq(&mut self, bus: &mut crate::bus::Bus) {
        // Check if interrupts are disabled; if so, ignore this IRQ
        if self.get_interrupt_disable() {
            return;
        }

        // Push PC to stack (high byte first, then low byte)
        self.stack_push_u16(bus, self.pc);

        // Push status flags with B flag clear and UNUSED flag set
        // IRQ pushes status with B=0 (to distinguish from BRK which pushes B=1)
        let status_to_push = (self.status & !flags::BREAK) | flags::UNUSED;
        self.stack_push(bus, status_to_push);

        // Set the Interrupt Disable flag
        self.set_interrupt_disable(true);

        // Load PC from IRQ vector ($FFFE-$FFFF)
        let lo = bus.read(vectors::IRQ) as u16;
        let hi = bus.read(vectors::IRQ.wrapping_add(1)) as u16;
        self.pc = (hi << 8) | lo;
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}
