/*!
jit: compiled-method cache and dispatcher (§4.H).

Overview
========
`JitCache` is a bounded, strict-LRU map from a 6502 entry address to a
`CompiledMethodEntry`; `Dispatcher` is what compiled artifacts call back
into for `JSR`/tail-`JMP` linkage (§4.F, §4.G) and what a host calls to
start execution at a vector address.

Grounded on the teacher's top-level `Nes`/bus-owner struct, which held
the single mutable path into the system and handed pieces of it out to
the CPU core as needed; here that role is split between `Dispatcher`
(identity, shared via `&self`) and the `Hal` it's handed per call
(mutable state). The cache itself has no teacher analogue - the teacher
never needed one - so its shape is grounded directly on §4.H instead.

Reentrancy (§5)
===============
Compiled artifacts call `dispatcher.run_method` recursively (JSR calling
into a callee, which may itself call further). `Dispatcher::run_method`
therefore never holds the cache's `RefCell` borrow across an artifact
invocation: it clones the `Rc<CompiledArtifact>` out, drops the borrow,
then calls it. The single-threaded cooperative model (§5) is what makes
`Rc<RefCell<_>>` sufficient here - the same reasoning already applied to
the cancellation token.
*/

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

use crate::codegen::{self, CompiledArtifact};
use crate::cpu::Hal;
use crate::customize::Customizer;
use crate::disasm::Disassembler;
use crate::error::{CoreError, Result};
use crate::partition::FunctionPartitioner;

/// Reference cache size named in §3.1 / §4.H.
pub const DEFAULT_CACHE_CAPACITY: usize = 100;

/// Tunable bound for `JitCache` (§3.1).
#[derive(Debug, Clone, Copy)]
pub struct JitCacheConfig {
    pub capacity: usize,
}

impl Default for JitCacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

struct CompiledMethodEntry {
    artifact: CompiledArtifact,
    addresses: BTreeSet<u16>,
    excluded_addresses: BTreeSet<u16>,
    last_used: u64,
}

/// Bounded, strict-LRU store of compiled methods keyed by entry address
/// (§4.H).
pub struct JitCache {
    capacity: usize,
    entries: HashMap<u16, CompiledMethodEntry>,
    clock: u64,
}

impl JitCache {
    pub fn new(config: JitCacheConfig) -> Self {
        Self {
            capacity: config.capacity.max(1),
            entries: HashMap::new(),
            clock: 0,
        }
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Look up a cached artifact, refreshing its recency on a hit (§4.H,
    /// §8 property 9 "a `get` on any entry moves it to most-recently-used").
    pub fn get(&mut self, address: u16) -> Option<CompiledArtifact> {
        let clock = self.tick();
        let entry = self.entries.get_mut(&address)?;
        entry.last_used = clock;
        Some(Rc::clone(&entry.artifact))
    }

    /// Insert a freshly compiled method, evicting the least-recently-used
    /// entry first if at capacity (§4.H, §8 property 9).
    pub fn insert(
        &mut self,
        entry_address: u16,
        artifact: CompiledArtifact,
        addresses: BTreeSet<u16>,
        excluded_addresses: BTreeSet<u16>,
    ) {
        if !self.entries.contains_key(&entry_address) && self.entries.len() >= self.capacity {
            self.evict_lru();
        }
        let clock = self.tick();
        self.entries.insert(
            entry_address,
            CompiledMethodEntry {
                artifact,
                addresses,
                excluded_addresses,
                last_used: clock,
            },
        );
    }

    fn evict_lru(&mut self) {
        if let Some(&victim) = self
            .entries
            .iter()
            .min_by_key(|(_, e)| e.last_used)
            .map(|(addr, _)| addr)
        {
            self.entries.remove(&victim);
            log::debug!("jit cache evict {victim:#06x}");
        }
    }

    /// Drop every cached entry whose instruction footprint covers `address`
    /// and hasn't excluded it from invalidation (§4.H, §8 property 8).
    pub fn memory_changed(&mut self, address: u16) {
        let stale: Vec<u16> = self
            .entries
            .iter()
            .filter(|(_, e)| e.addresses.contains(&address) && !e.excluded_addresses.contains(&address))
            .map(|(&addr, _)| addr)
            .collect();
        for addr in stale {
            self.entries.remove(&addr);
            log::trace!("jit cache invalidate {addr:#06x}");
        }
    }

    /// Unconditionally drop the entry at `address` (§4.H "the outer caller
    /// discards any cached artifact at the currently executing address").
    pub fn invalidate(&mut self, address: u16) {
        if self.entries.remove(&address).is_some() {
            log::trace!("jit cache invalidate (self-modified) {address:#06x}");
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, address: u16) -> bool {
        self.entries.contains_key(&address)
    }
}

/// Finds or compiles a method for an entry address and runs it (§4.H).
pub struct Dispatcher {
    cache: Rc<RefCell<JitCache>>,
    excluded: RefCell<HashMap<u16, BTreeSet<u16>>>,
    customizer: Option<Box<dyn Customizer>>,
}

impl Dispatcher {
    pub fn new(config: JitCacheConfig) -> Self {
        Self {
            cache: Rc::new(RefCell::new(JitCache::new(config))),
            excluded: RefCell::new(HashMap::new()),
            customizer: None,
        }
    }

    pub fn with_customizer(config: JitCacheConfig, customizer: Box<dyn Customizer>) -> Self {
        Self {
            cache: Rc::new(RefCell::new(JitCache::new(config))),
            excluded: RefCell::new(HashMap::new()),
            customizer: Some(customizer),
        }
    }

    /// A write callback suitable for `Bus::set_write_observer` (§4.J);
    /// installed once, it keeps this dispatcher's cache coherent with
    /// every write that lands on the bus the HAL it's called with owns.
    pub fn write_observer(&self) -> crate::bus::WriteObserver {
        let cache = Rc::clone(&self.cache);
        Box::new(move |addr| cache.borrow_mut().memory_changed(addr))
    }

    /// Register addresses a client knows are benign self-writes (e.g. a
    /// self-updating jump table) for the method compiled at `entry`, so
    /// `memory_changed` on those addresses doesn't evict it (§3
    /// "Compiled Method Entry... excluded addresses").
    pub fn set_excluded_addresses(&self, entry: u16, addresses: BTreeSet<u16>) {
        self.excluded.borrow_mut().insert(entry, addresses);
    }

    pub fn cache_len(&self) -> usize {
        self.cache.borrow().len()
    }

    /// Run the 6502 subroutine at `address`: find it in the cache,
    /// compiling it on a miss, then invoke it. After it returns, a
    /// pending recompile latch (set by a self-modifying write during this
    /// very call) discards this entry's cache slot so the *next* call
    /// recompiles fresh (§4.H, §9 "self-modifying code during the current
    /// call").
    pub fn run_method(&self, address: u16, hal: &mut Hal) -> Result<()> {
        let cached = self.cache.borrow_mut().get(address);
        let artifact = match cached {
            Some(a) => a,
            None => {
                let function = self.build_function(address, hal)?;
                let compiled = codegen::compile(&function, self.customizer.as_deref())?;
                let addresses: BTreeSet<u16> =
                    function.instructions.iter().map(|i| i.address).collect();
                let excluded = self
                    .excluded
                    .borrow()
                    .get(&address)
                    .cloned()
                    .unwrap_or_default();
                self.cache
                    .borrow_mut()
                    .insert(address, Rc::clone(&compiled), addresses, excluded);
                compiled
            }
        };

        artifact(self, hal)?;

        if hal.poll_for_recompilation() {
            self.cache.borrow_mut().invalidate(address);
        }
        Ok(())
    }

    fn build_function(&self, address: u16, hal: &Hal) -> Result<crate::partition::Function> {
        let mut disasm = Disassembler::new();
        disasm.decode(&hal.bus, &[address])?;
        FunctionPartitioner::partition(&disasm, &[address])
            .into_iter()
            .find(|f| f.entry == address)
            .ok_or(CoreError::UnknownFunction(address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::device::Ram;
    use crate::bus::Bus;

    fn hal_with(prg: &[(u16, u8)]) -> Hal {
        let mut bus = Bus::new();
        bus.attach(Box::new(Ram::new(0x10000)), 0x0000, 0x10000)
            .unwrap();
        for &(addr, byte) in prg {
            bus.write(addr, byte);
        }
        Hal::new(bus)
    }

    #[test]
    fn run_method_compiles_once_and_hits_cache_on_recall() {
        let mut hal = hal_with(&[(0x0000, 0xA9), (0x0001, 0x01), (0x0002, 0x60)]); // LDA #$01 ; RTS
        let dispatcher = Dispatcher::new(JitCacheConfig::default());
        dispatcher.run_method(0x0000, &mut hal).unwrap();
        assert_eq!(dispatcher.cache_len(), 1);
        dispatcher.run_method(0x0000, &mut hal).unwrap();
        assert_eq!(dispatcher.cache_len(), 1);
    }

    #[test]
    fn jsr_round_trip_invokes_callee_once() {
        // main: JSR $0010 ; RTS    callee at $0010: RTS
        let mut hal = hal_with(&[
            (0x0000, 0x20),
            (0x0001, 0x10),
            (0x0002, 0x00),
            (0x0003, 0x60),
            (0x0010, 0x60),
        ]);
        let dispatcher = Dispatcher::new(JitCacheConfig::default());
        dispatcher.run_method(0x0000, &mut hal).unwrap();
        assert_eq!(dispatcher.cache_len(), 2);
    }

    #[test]
    fn cache_invalidates_on_overlapping_write_and_keeps_excluded() {
        let config = JitCacheConfig { capacity: 10 };
        let mut cache = JitCache::new(config);
        let artifact: CompiledArtifact = Rc::new(|_: &Dispatcher, _: &mut Hal| Ok(()));
        let addresses: BTreeSet<u16> = [0x8000u16, 0x8001, 0x8003].into_iter().collect();
        cache.insert(0x8000, Rc::clone(&artifact), addresses.clone(), BTreeSet::new());
        assert!(cache.get(0x8000).is_some());

        cache.memory_changed(0x8003);
        assert!(cache.get(0x8000).is_none());

        cache.insert(0x9000, artifact, addresses, [0x9000u16].into_iter().collect());
        cache.memory_changed(0x9000);
        assert!(cache.get(0x9000).is_some());
    }

    #[test]
    fn lru_eviction_drops_oldest_entry_first() {
        let config = JitCacheConfig { capacity: 2 };
        let mut cache = JitCache::new(config);
        let artifact: CompiledArtifact = Rc::new(|_: &Dispatcher, _: &mut Hal| Ok(()));
        cache.insert(0x0001, Rc::clone(&artifact), BTreeSet::new(), BTreeSet::new());
        cache.insert(0x0002, Rc::clone(&artifact), BTreeSet::new(), BTreeSet::new());
        cache.get(0x0001); // refresh 0x0001 so 0x0002 becomes the LRU victim
        cache.insert(0x0003, artifact, BTreeSet::new(), BTreeSet::new());
        assert!(!cache.contains(0x0002));
        assert!(cache.contains(0x0001));
        assert!(cache.contains(0x0003));
    }
}
