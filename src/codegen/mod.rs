/*!
codegen: IR -> compiled artifact (§4.G).

Overview
========
Turns a partitioned `Function`'s lowered IR into a single
`CompiledArtifact` - a boxed closure taking the dispatcher and the HAL,
returning once the 6502 function has logically returned. "Compiling"
here never produces literal native machine code: every `Jump` target is
resolved to an index into a flat `Vec<ResolvedOp>` the closure owns, and
the closure is just a small bytecode interpreter over that vector. This
keeps the whole pipeline - lowering AND codegen - pure safe Rust with no
platform-specific backend (§1 "concrete instructions... represented
generically").

Two passes (§4.G)
==================
1. `flatten`: lower every instruction (consulting a `Customizer` if one
   is supplied), concatenate their IR in address order into one
   function-wide op list. Every instruction's IR starts with exactly one
   `ir::Instruction::Label` (§3 contract (a)); this is the
   "label-collection pass" - walking each `Label` as it's reached and
   recording the flat index it names. No `Label` node itself survives
   into the flat op list, since it has no runtime effect of its own.
2. `resolve`: walk the flat list once more, turning every `Jump`/
   `JumpIfZero`/`JumpIfNotZero` label string into the index that pass 1
   recorded for it. A label referenced but never recorded is
   `CoreError::UnresolvedBranch`.

Call linkage has no guest-stack footprint (§4.F, §4.G, §9)
============================================================
`JSR` lowers to a lone `CallFunction`; `RTS` lowers to a lone `Return`.
Per §4.F, `CallFunction`'s semantics are a nested dispatch and
`Return`'s is the artifact's closure returning - *neither* pushes or
pops the 6502 stack. The host-language call/return supplies the
linkage a real 6502 gets from pushing/popping PC, so `ResolvedOp::Call`
simply recurses into the dispatcher and falls through, and
`ResolvedOp::Return` simply ends the closure.

An unconditional `JMP` to another function's entry (or any indirect
`JMP`) lowers to `[CallFunction, Return]`, recognized here as a single
`ResolvedOp::TailCall` that recurses into the dispatcher and
propagates its result directly as a genuine Rust tail call - an
optimization over running `Call` then immediately `Return`, not a
semantic difference, since neither touches the stack either way.

`BRK` pushes only the status byte (with Break set) before recursing
into the dispatcher at the vector the host's interrupt hook resolves,
and also persists InterruptDisable and BFlag into the live status
register (§4.F: both are named as distinct effects from the push
itself); `RTI` pops that status byte and then returns like any other
`Return` - no address is ever pushed or popped for either.
*/

use std::collections::HashMap;
use std::rc::Rc;

use crate::cpu::{Hal, Register};
use crate::customize::Customizer;
use crate::error::{CoreError, Result};
use crate::ir::{
    BinaryOp, ConvertedInstruction, Flag, IndexReg, Indirection, Instruction, Reg, TargetAddress,
    UnaryOp, Value,
};
use crate::jit::Dispatcher;
use crate::lower::lower_function;
use crate::partition::Function;

/// A compiled 6502 function: call it with the dispatcher (for JSR/JMP
/// recursion) and the HAL it should read and mutate. `Rc`, not `Box`, so
/// the JIT cache can hand a caller an owned handle without holding its
/// own borrow across the call - which matters because the call may
/// recursively ask the cache for another entry (§4.H, §5 single-threaded
/// cooperative model, already `Rc`-based for the cancellation token).
pub type CompiledArtifact = Rc<dyn Fn(&Dispatcher, &mut Hal) -> Result<()>>;

/// Extra scratch variables allocated beyond the highest index lowering
/// actually used, to absorb customizer-inserted IR that wants a couple
/// of additional slots without recomputing allocation (§4.G).
const SCRATCH_SLACK: u32 = 4;

#[derive(Debug, Clone)]
enum FlatOp {
    Copy { src: Value, dst: Value },
    Binary { op: BinaryOp, left: Value, right: Value, dst: Value },
    Unary { op: UnaryOp, src: Value, dst: Value },
    ConvertToByte(Value),
    Jump(String),
    JumpIfZero(Value, String),
    JumpIfNotZero(Value, String),
    PushStack(Value),
    PopStack(Value),
    Call(TargetAddress),
    TailCall(TargetAddress),
    InvokeSoftwareInterrupt,
    Return,
    DebugString(String),
}

#[derive(Debug, Clone)]
enum ResolvedOp {
    Copy { src: Value, dst: Value },
    Binary { op: BinaryOp, left: Value, right: Value, dst: Value },
    Unary { op: UnaryOp, src: Value, dst: Value },
    ConvertToByte(Value),
    Jump(usize),
    JumpIfZero(Value, usize),
    JumpIfNotZero(Value, usize),
    PushStack(Value),
    PopStack(Value),
    Call(TargetAddress),
    TailCall(TargetAddress),
    InvokeSoftwareInterrupt,
    Return,
    DebugString(String),
}

/// Compile a partitioned function into a dispatchable artifact (§4.G).
pub fn compile(function: &Function, customizer: Option<&dyn Customizer>) -> Result<CompiledArtifact> {
    let converted = lower_function(function, customizer)?;
    let var_count = allocate_variables(&converted);
    let (flat, labels) = flatten(&converted);
    let ops = resolve(flat, &labels)?;

    let artifact: CompiledArtifact = Rc::new(move |dispatcher: &Dispatcher, hal: &mut Hal| {
        run(&ops, var_count, dispatcher, hal)
    });
    Ok(artifact)
}

fn allocate_variables(converted: &[ConvertedInstruction]) -> u32 {
    let mut max_index: Option<u32> = None;
    let mut note = |v: &Value| {
        if let Value::Variable(n) = v {
            max_index = Some(max_index.map_or(*n, |m| m.max(*n)));
        }
    };
    for c in converted {
        for node in &c.ir {
            visit_values(node, &mut note);
        }
    }
    max_index.map_or(SCRATCH_SLACK, |m| m + 1 + SCRATCH_SLACK)
}

fn visit_values(node: &Instruction, f: &mut impl FnMut(&Value)) {
    match node {
        Instruction::Copy { src, dst } => {
            f(src);
            f(dst);
        }
        Instruction::Binary { left, right, dst, .. } => {
            f(left);
            f(right);
            f(dst);
        }
        Instruction::Unary { src, dst, .. } => {
            f(src);
            f(dst);
        }
        Instruction::ConvertVariableToByte(v) => f(v),
        Instruction::JumpIfZero { cond, .. } | Instruction::JumpIfNotZero { cond, .. } => f(cond),
        Instruction::PushStackValue(v) | Instruction::PopStackValue(v) => f(v),
        Instruction::Jump(_)
        | Instruction::Label(_)
        | Instruction::CallFunction(_)
        | Instruction::InvokeSoftwareInterrupt
        | Instruction::Return
        | Instruction::StoreDebugString(_) => {}
    }
}

fn flatten(converted: &[ConvertedInstruction]) -> (Vec<FlatOp>, HashMap<String, usize>) {
    let mut flat = Vec::new();
    let mut labels = HashMap::new();

    for c in converted {
        // Every instruction's IR starts with exactly one `Label` (§3
        // contract (a), enforced uniformly by `lower_instruction`); the
        // label-collection pass (§4.G step 1) walks it here rather than
        // deriving a position from `c.address` directly.
        if c.mnemonic == "JMP" {
            if let [Instruction::Label(name), Instruction::CallFunction(target), Instruction::Return] =
                c.ir.as_slice()
            {
                labels.insert(name.clone(), flat.len());
                flat.push(FlatOp::TailCall(*target));
                continue;
            }
        }

        for node in &c.ir {
            let op = match node {
                Instruction::Label(name) => {
                    labels.insert(name.clone(), flat.len());
                    continue;
                }
                Instruction::Copy { src, dst } => FlatOp::Copy {
                    src: src.clone(),
                    dst: dst.clone(),
                },
                Instruction::Binary { op, left, right, dst } => FlatOp::Binary {
                    op: *op,
                    left: left.clone(),
                    right: right.clone(),
                    dst: dst.clone(),
                },
                Instruction::Unary { op, src, dst } => FlatOp::Unary {
                    op: *op,
                    src: src.clone(),
                    dst: dst.clone(),
                },
                Instruction::ConvertVariableToByte(v) => FlatOp::ConvertToByte(v.clone()),
                Instruction::Jump(label) => FlatOp::Jump(label.clone()),
                Instruction::JumpIfZero { cond, label } => {
                    FlatOp::JumpIfZero(cond.clone(), label.clone())
                }
                Instruction::JumpIfNotZero { cond, label } => {
                    FlatOp::JumpIfNotZero(cond.clone(), label.clone())
                }
                Instruction::PushStackValue(v) => FlatOp::PushStack(v.clone()),
                Instruction::PopStackValue(v) => FlatOp::PopStack(v.clone()),
                Instruction::CallFunction(target) => FlatOp::Call(*target),
                Instruction::InvokeSoftwareInterrupt => FlatOp::InvokeSoftwareInterrupt,
                Instruction::Return => FlatOp::Return,
                Instruction::StoreDebugString(s) => FlatOp::DebugString(s.clone()),
            };
            flat.push(op);
        }
    }
    (flat, labels)
}

fn resolve(flat: Vec<FlatOp>, labels: &HashMap<String, usize>) -> Result<Vec<ResolvedOp>> {
    let resolve_label = |label: &str| {
        labels
            .get(label)
            .copied()
            .ok_or_else(|| CoreError::UnresolvedBranch(label.to_string()))
    };

    flat.into_iter()
        .map(|op| {
            Ok(match op {
                FlatOp::Copy { src, dst } => ResolvedOp::Copy { src, dst },
                FlatOp::Binary { op, left, right, dst } => {
                    ResolvedOp::Binary { op, left, right, dst }
                }
                FlatOp::Unary { op, src, dst } => ResolvedOp::Unary { op, src, dst },
                FlatOp::ConvertToByte(v) => ResolvedOp::ConvertToByte(v),
                FlatOp::Jump(label) => ResolvedOp::Jump(resolve_label(&label)?),
                FlatOp::JumpIfZero(cond, label) => {
                    ResolvedOp::JumpIfZero(cond, resolve_label(&label)?)
                }
                FlatOp::JumpIfNotZero(cond, label) => {
                    ResolvedOp::JumpIfNotZero(cond, resolve_label(&label)?)
                }
                FlatOp::PushStack(v) => ResolvedOp::PushStack(v),
                FlatOp::PopStack(v) => ResolvedOp::PopStack(v),
                FlatOp::Call(target) => ResolvedOp::Call(target),
                FlatOp::TailCall(target) => ResolvedOp::TailCall(target),
                FlatOp::InvokeSoftwareInterrupt => ResolvedOp::InvokeSoftwareInterrupt,
                FlatOp::Return => ResolvedOp::Return,
                FlatOp::DebugString(s) => ResolvedOp::DebugString(s),
            })
        })
        .collect()
}

fn run(ops: &[ResolvedOp], var_count: u32, dispatcher: &Dispatcher, hal: &mut Hal) -> Result<()> {
    let mut vars = vec![0u32; var_count as usize];
    let mut pc = 0usize;

    loop {
        // The recompile-pending latch is deliberately left untouched here:
        // only the outer `Dispatcher::run_method` call for *this* address
        // polls and clears it, once this closure returns (§4.H, §9
        // "self-modifying code during the current call").
        let Some(op) = ops.get(pc) else {
            return Ok(());
        };
        match op {
            ResolvedOp::Return => return Ok(()),
            ResolvedOp::TailCall(target) => {
                let resolved = resolve_target(target, hal);
                return dispatcher.run_method(resolved, hal);
            }
            ResolvedOp::Jump(target) => {
                pc = *target;
                continue;
            }
            ResolvedOp::JumpIfZero(cond, target) => {
                if read_value(cond, hal, &vars)? == 0 {
                    pc = *target;
                    continue;
                }
            }
            ResolvedOp::JumpIfNotZero(cond, target) => {
                if read_value(cond, hal, &vars)? != 0 {
                    pc = *target;
                    continue;
                }
            }
            ResolvedOp::Copy { src, dst } => {
                let v = read_value(src, hal, &vars)?;
                write_value(dst, v, hal, &mut vars)?;
            }
            ResolvedOp::Binary { op, left, right, dst } => {
                let l = read_value(left, hal, &vars)?;
                let r = read_value(right, hal, &vars)?;
                write_value(dst, apply_binary(*op, l, r), hal, &mut vars)?;
            }
            ResolvedOp::Unary { op, src, dst } => {
                let v = read_value(src, hal, &vars)?;
                write_value(dst, apply_unary(*op, v), hal, &mut vars)?;
            }
            ResolvedOp::ConvertToByte(v) => {
                let value = read_value(v, hal, &vars)?;
                write_value(v, value & 0xFF, hal, &mut vars)?;
            }
            ResolvedOp::PushStack(v) => {
                let value = read_value(v, hal, &vars)?;
                hal.push(value as u8)?;
            }
            ResolvedOp::PopStack(v) => {
                let popped = hal.pop()?;
                write_value(v, popped as u32, hal, &mut vars)?;
            }
            ResolvedOp::Call(target) => {
                let resolved = resolve_target(target, hal);
                dispatcher.run_method(resolved, hal)?;
            }
            ResolvedOp::InvokeSoftwareInterrupt => {
                let status = hal.status_for_push(true);
                hal.push(status)?;
                hal.set_flag(Flag::InterruptDisable, true);
                hal.set_flag(Flag::BFlag, true);
                let vector = hal.trigger_software_interrupt();
                dispatcher.run_method(vector, hal)?;
            }
            ResolvedOp::DebugString(s) => hal.debug_hook(s),
        }
        pc += 1;
    }
}

fn resolve_target(target: &TargetAddress, hal: &Hal) -> u16 {
    if !target.is_indirect {
        return target.address;
    }
    let ptr = target.address;
    let hi_addr = (ptr & 0xFF00) | (ptr.wrapping_add(1) & 0x00FF);
    let lo = hal.read_memory(ptr) as u16;
    let hi = hal.read_memory(hi_addr) as u16;
    (hi << 8) | lo
}

fn map_register(r: Reg) -> Register {
    match r {
        Reg::A => Register::A,
        Reg::X => Register::X,
        Reg::Y => Register::Y,
    }
}

fn read_word_zp(hal: &Hal, base: u8) -> u16 {
    let lo = hal.read_memory(base as u16) as u16;
    let hi = hal.read_memory(base.wrapping_add(1) as u16) as u16;
    (hi << 8) | lo
}

fn effective_address(value: &Value, hal: &Hal) -> u16 {
    match value {
        Value::Memory { address, index, single_byte } => {
            let idx = match index {
                Some(IndexReg::X) => hal.register(Register::X) as u16,
                Some(IndexReg::Y) => hal.register(Register::Y) as u16,
                None => 0,
            };
            if *single_byte {
                address.wrapping_add(idx) & 0x00FF
            } else {
                address.wrapping_add(idx)
            }
        }
        Value::IndirectMemory { base, mode } => match mode {
            Indirection::PreIndexedX => {
                let zp = base.wrapping_add(hal.register(Register::X));
                read_word_zp(hal, zp)
            }
            Indirection::PostIndexedY => {
                let ptr = read_word_zp(hal, *base);
                ptr.wrapping_add(hal.register(Register::Y) as u16)
            }
        },
        _ => 0,
    }
}

fn read_value(value: &Value, hal: &Hal, vars: &[u32]) -> Result<u32> {
    Ok(match value {
        Value::Constant(c) => *c as u32,
        Value::Register(r) => hal.register(map_register(*r)) as u32,
        Value::StackPointer => hal.sp() as u32,
        Value::Flag(f) => hal.flag(*f) as u32,
        Value::AllFlags => hal.processor_status() as u32,
        Value::StatusForPush => hal.status_for_push(true) as u32,
        Value::Memory { .. } | Value::IndirectMemory { .. } => {
            hal.read_memory(effective_address(value, hal)) as u32
        }
        Value::Variable(n) => *vars.get(*n as usize).ok_or_else(|| {
            CoreError::ConfigurationError(format!("variable slot {n} out of range"))
        })?,
    })
}

fn write_value(value: &Value, v: u32, hal: &mut Hal, vars: &mut [u32]) -> Result<()> {
    match value {
        Value::Constant(_) => {
            return Err(CoreError::ConfigurationError(
                "cannot write to a constant IR value".to_string(),
            ))
        }
        Value::Register(r) => hal.set_register(map_register(*r), v as u8),
        Value::StackPointer => hal.set_sp(v as u8),
        Value::Flag(f) => hal.set_flag(*f, v != 0),
        Value::AllFlags => hal.set_processor_status(v as u8),
        Value::StatusForPush => {
            return Err(CoreError::ConfigurationError(
                "cannot write to a push-only IR value".to_string(),
            ))
        }
        Value::Memory { .. } | Value::IndirectMemory { .. } => {
            let addr = effective_address(value, hal);
            hal.write_memory(addr, v as u8);
        }
        Value::Variable(n) => {
            let slot = vars.get_mut(*n as usize).ok_or_else(|| {
                CoreError::ConfigurationError(format!("variable slot {n} out of range"))
            })?;
            *slot = v;
        }
    }
    Ok(())
}

fn apply_binary(op: BinaryOp, l: u32, r: u32) -> u32 {
    match op {
        BinaryOp::Add => l.wrapping_add(r),
        BinaryOp::Sub => l.wrapping_sub(r),
        BinaryOp::And => l & r,
        BinaryOp::Or => l | r,
        BinaryOp::Xor => l ^ r,
        BinaryOp::ShiftLeft => l.wrapping_shl(r),
        BinaryOp::ShiftRight => l.wrapping_shr(r),
        BinaryOp::Equals => (l == r) as u32,
        BinaryOp::NotEquals => (l != r) as u32,
        BinaryOp::LessThan => (l < r) as u32,
        BinaryOp::LessThanOrEqualTo => (l <= r) as u32,
        BinaryOp::GreaterThan => (l > r) as u32,
        BinaryOp::GreaterThanOrEqualTo => (l >= r) as u32,
    }
}

fn apply_unary(op: UnaryOp, v: u32) -> u32 {
    match op {
        UnaryOp::BitwiseNot => (!v) & 0xFF,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::device::Ram;
    use crate::bus::Bus;
    use crate::disasm::Disassembler;
    use crate::jit::{Dispatcher, JitCacheConfig};
    use crate::partition::FunctionPartitioner;

    fn build(prg: &[(u16, u8)]) -> Bus {
        let mut bus = Bus::new();
        bus.attach(Box::new(Ram::new(0x10000)), 0x0000, 0x10000)
            .unwrap();
        for &(addr, byte) in prg {
            bus.write(addr, byte);
        }
        bus
    }

    fn load(bus: &mut Bus, addr: u16, bytes: &[u8]) {
        for (i, b) in bytes.iter().enumerate() {
            bus.write(addr.wrapping_add(i as u16), *b);
        }
    }

    #[test]
    fn lda_immediate_sets_accumulator_and_zero_flag() {
        let mut bus = build(&[]);
        // LDA #$00 ; RTS
        load(&mut bus, 0x0000, &[0xA9, 0x00, 0x60]);
        let mut d = Disassembler::new();
        d.decode(&bus, &[0x0000]).unwrap();
        let functions = FunctionPartitioner::partition(&d, &[0x0000]);
        let artifact = compile(&functions[0], None).unwrap();

        let hal_bus = {
            let mut b = Bus::new();
            // Move the decoded program's backing memory into a fresh Hal's bus.
            b.attach(Box::new(Ram::new(0x10000)), 0x0000, 0x10000)
                .unwrap();
            b
        };
        let mut hal = Hal::new(hal_bus);
        hal.write_memory(0x0000, 0xA9);
        hal.write_memory(0x0001, 0x00);
        hal.write_memory(0x0002, 0x60);

        let dispatcher = Dispatcher::new(JitCacheConfig::default());
        artifact(&dispatcher, &mut hal).unwrap();
        assert_eq!(hal.register(Register::A), 0x00);
        assert!(hal.flag(Flag::Zero));
        assert_eq!(hal.sp(), 0xFF); // RTS touches no guest stack bytes (§4.F)
    }

    #[test]
    fn branch_skips_to_label() {
        let mut bus = build(&[]);
        // LDA #$01 ; BNE +2 ; LDA #$FF ; RTS(at 6) ; target at 6: RTS
        load(&mut bus, 0x0000, &[0xA9, 0x01, 0xD0, 0x02, 0xA9, 0xFF, 0x60]);
        let mut d = Disassembler::new();
        d.decode(&bus, &[0x0000]).unwrap();
        let functions = FunctionPartitioner::partition(&d, &[0x0000]);
        let artifact = compile(&functions[0], None).unwrap();

        let mut hal_bus = Bus::new();
        hal_bus.attach(Box::new(Ram::new(0x10000)), 0x0000, 0x10000).unwrap();
        let mut hal = Hal::new(hal_bus);

        let dispatcher = Dispatcher::new(JitCacheConfig::default());
        artifact(&dispatcher, &mut hal).unwrap();
        assert_eq!(hal.register(Register::A), 0x01); // skipped the LDA #$FF
    }
}
