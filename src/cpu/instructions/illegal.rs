// Illegal (undocumented) 6502 opcodes
//
// These fall out of the 6502's incomplete opcode decoding and were never
// part of the official instruction set, but several NES games and most
// test ROMs rely on them. Each one here is built from the same primitives
// as the official opcodes it combines - e.g. SLO is exactly ASL followed by
// ORA against the same effective address.

use crate::bus::Bus;
use crate::cpu::addressing::AddressingResult;
use crate::cpu::Cpu;

impl Cpu {
    /// LAX - Load Accumulator and X
    ///
    /// Loads a byte from memory into both A and X. Equivalent to LDA
    /// immediately followed by TAX, but as a single atomic memory access.
    ///
    /// Flags affected: Z, N
    pub fn lax(&mut self, bus: &Bus, addr_result: &AddressingResult) {
        let value = self.read_operand(bus, addr_result);
        self.a = value;
        self.x = value;
        self.update_zero_and_negative_flags(value);
    }

    /// SAX - Store A AND X
    ///
    /// Stores the bitwise AND of A and X to memory. Does not affect flags.
    pub fn sax(&self, bus: &mut Bus, addr_result: &AddressingResult) {
        bus.write(addr_result.address, self.a & self.x);
    }

    /// DCP - Decrement memory then Compare with A
    ///
    /// Equivalent to DEC followed by CMP against the same address.
    pub fn dcp(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        self.dec(bus, addr_result);
        self.cmp(bus, addr_result);
    }

    /// ISC (a.k.a. ISB) - Increment memory then Subtract with Carry
    ///
    /// Equivalent to INC followed by SBC against the same address.
    pub fn isc(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        self.inc(bus, addr_result);
        self.sbc(bus, addr_result);
    }

    /// RLA - Rotate Left then AND
    ///
    /// Equivalent to ROL followed by AND against the same address.
    pub fn rla(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        self.rol(bus, addr_result, false);
        self.and(bus, addr_result);
    }

    /// RRA - Rotate Right then Add with Carry
    ///
    /// Equivalent to ROR followed by ADC against the same address.
    pub fn rra(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        self.ror(bus, addr_result, false);
        self.adc(bus, addr_result);
    }

    /// SLO (a.k.a. ASO) - Shift Left then OR
    ///
    /// Equivalent to ASL followed by ORA against the same address.
    pub fn slo(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        self.asl(bus, addr_result, false);
        self.ora(bus, addr_result);
    }

    /// SRE (a.k.a. LSE) - Shift Right then EOR
    ///
    /// Equivalent to LSR followed by EOR against the same address.
    pub fn sre(&mut self, bus: &mut Bus, addr_result: &AddressingResult) {
        self.lsr(bus, addr_result, false);
        self.eor(bus, addr_result);
    }

    /// ANC - AND then copy bit 7 into Carry
    ///
    /// Used by test ROMs to set the carry flag from an immediate value in
    /// one instruction. Flags affected: Z, N, C.
    pub fn anc(&mut self, bus: &Bus, addr_result: &AddressingResult) {
        let value = self.read_operand(bus, addr_result);
        self.a &= value;
        self.update_zero_and_negative_flags(self.a);
        self.set_carry(self.get_negative());
    }

    /// ALR (a.k.a. ASR) - AND then Logical Shift Right on the accumulator
    ///
    /// Flags affected: C, Z, N.
    pub fn alr(&mut self, bus: &Bus, addr_result: &AddressingResult) {
        let value = self.read_operand(bus, addr_result);
        self.a &= value;
        self.set_carry(self.a & 0x01 != 0);
        self.a >>= 1;
        self.update_zero_and_negative_flags(self.a);
    }

    /// ARR - AND then Rotate Right on the accumulator, with carry/overflow
    /// derived from the result's top two bits rather than the usual ROR rule.
    ///
    /// Flags affected: C, V, Z, N.
    pub fn arr(&mut self, bus: &Bus, addr_result: &AddressingResult) {
        let value = self.read_operand(bus, addr_result);
        self.a &= value;
        let carry_in = if self.get_carry() { 0x80 } else { 0x00 };
        self.a = (self.a >> 1) | carry_in;
        self.update_zero_and_negative_flags(self.a);
        self.set_carry(self.a & 0x40 != 0);
        let bit5 = (self.a & 0x20) != 0;
        self.set_overflow(((self.a & 0x40) != 0) ^ bit5);
    }

    /// AXS (a.k.a. SBX) - (A AND X) minus immediate, result into X
    ///
    /// Behaves like CMP followed by DEX against the AND of A and X: sets
    /// Carry as a borrow-free subtraction would, no overflow flag.
    pub fn axs(&mut self, bus: &Bus, addr_result: &AddressingResult) {
        let value = self.read_operand(bus, addr_result);
        let and_result = self.a & self.x;
        let (result, borrow) = and_result.overflowing_sub(value);
        self.x = result;
        self.set_carry(!borrow);
        self.update_zero_and_negative_flags(self.x);
    }

    /// LAS - AND memory with the stack pointer, loading the result into A, X, and SP
    ///
    /// Flags affected: Z, N.
    pub fn las(&mut self, bus: &Bus, addr_result: &AddressingResult) {
        let value = self.read_operand(bus, addr_result);
        let result = value & self.sp;
        self.a = result;
        self.x = result;
        self.sp = result;
        self.update_zero_and_negative_flags(result);
    }

    /// KIL (a.k.a. JAM/STP/HLT) - locks the CPU up until the next reset.
    ///
    /// No real program relies on hitting one of these deliberately; they
    /// exist here so a test ROM that does hit one halts cleanly instead of
    /// being silently skipped.
    pub fn kil(&mut self) {
        self.halted = true;
    }

    /// AHX/SHX/SHY/TAS - the "unstable" store opcodes. Their real behavior
    /// depends on internal bus conflicts that vary across 2A03 revisions;
    /// treated as no-ops rather than guessing at undefined hardware quirks.
    pub fn unstable_store_noop(&mut self, _bus: &mut Bus, _addr_result: &AddressingResult) {}

    /// XAA - another unstable opcode (AND between A, X, and an immediate,
    /// with an undocumented "magic constant" term on real hardware).
    /// Treated as a no-op for the same reason as the unstable stores.
    pub fn xaa(&mut self, _bus: &Bus, _addr_result: &AddressingResult) {}
}
