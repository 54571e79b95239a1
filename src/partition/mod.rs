/*!
partition: grouping decoded instructions into callable functions (§4.D).

Overview
========
A `Function` is the unit of compilation: the JIT cache stores and
dispatches compiled methods keyed by entry address, so the pipeline needs
to know where one function's instructions end and another's begin before
it can lower and codegen each independently.

A function's entry points are exactly the addresses something calls via
`JSR`, plus any entry address passed in explicitly (reset/NMI/IRQ
vectors - those are "called" by hardware, not by a 6502 `JSR`, but play
the same role). A function's body is every instruction reachable from its
entry by straight-line flow and branches, stopping at `RTS`/`RTI`, or at
the entry point of another function (so functions never overlap).

Grounded on the teacher's module boundary between `cpu::table`'s
per-opcode metadata and the dispatch layer that consumes it: the teacher
never needed a partitioning step because it interpreted one instruction
at a time, but the same "classify, then group" shape applies here one
level up.
*/

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::disasm::{DecodedInstruction, Disassembler};

/// One compilable unit: an entry address and every instruction reachable
/// from it that doesn't belong to some other function (§4.D).
#[derive(Debug, Clone)]
pub struct Function {
    pub entry: u16,
    /// Instructions in ascending address order.
    pub instructions: Vec<DecodedInstruction>,
}

impl Function {
    pub fn contains(&self, address: u16) -> bool {
        self.instructions.iter().any(|i| i.address == address)
    }
}

/// Splits a disassembled instruction stream into functions (§4.D).
pub struct FunctionPartitioner;

impl FunctionPartitioner {
    /// `call_targets` are addresses known to be entered via `JSR` (or an
    /// external entry point such as a reset/interrupt vector). Every
    /// other decoded address is folded into whichever function reaches
    /// it first by straight-line/branch flow.
    pub fn partition(disasm: &Disassembler, call_targets: &[u16]) -> Vec<Function> {
        let entries: BTreeSet<u16> = call_targets.iter().copied().collect();
        let owned: BTreeMap<u16, u16> = Self::assign_owners(disasm, &entries);

        let mut bodies: BTreeMap<u16, Vec<DecodedInstruction>> = BTreeMap::new();
        for instr in disasm.instructions() {
            if let Some(&owner) = owned.get(&instr.address) {
                bodies.entry(owner).or_default().push(instr.clone());
            }
        }

        entries
            .into_iter()
            .map(|entry| Function {
                entry,
                instructions: bodies.remove(&entry).unwrap_or_default(),
            })
            .collect()
    }

    /// Breadth-first ownership assignment: each entry claims every
    /// address reachable from it that isn't itself another entry point,
    /// so functions partition the decoded set without overlap (§4.D
    /// invariant).
    fn assign_owners(disasm: &Disassembler, entries: &BTreeSet<u16>) -> BTreeMap<u16, u16> {
        let mut owner: BTreeMap<u16, u16> = BTreeMap::new();

        for &entry in entries {
            if owner.contains_key(&entry) {
                continue;
            }
            let mut queue = VecDeque::new();
            queue.push_back(entry);
            while let Some(addr) = queue.pop_front() {
                if owner.contains_key(&addr) {
                    continue;
                }
                if addr != entry && entries.contains(&addr) {
                    continue;
                }
                let Some(instr) = disasm.get(addr) else {
                    continue;
                };
                owner.insert(addr, entry);

                if let Some(target) = instr.target {
                    if instr.mnemonic != "JSR" {
                        queue.push_back(target);
                    }
                }
                let falls_through = !matches!(instr.mnemonic, "RTS" | "RTI" | "JMP");
                if falls_through {
                    queue.push_back(instr.next_address());
                }
            }
        }
        owner
    }
}
