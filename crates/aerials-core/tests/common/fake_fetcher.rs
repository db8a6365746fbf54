//! In-memory `Fetcher` with scripted faults, for deterministic retry, resume
//! and worker-bound tests.

use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use aerials_core::fetch_head::HeadResult;
use aerials_core::retry::TransferError;
use aerials_core::transfer::Fetcher;

/// CURLE_PARTIAL_FILE: retryable.
const CURLE_PARTIAL_FILE: u32 = 18;
const CHUNK: usize = 1024;

#[derive(Debug, Clone, Copy)]
pub enum Fault {
    /// Deliver up to `n` bytes, then fail with a partial-file transport error.
    DropAfter(u64),
    /// Answer the GET (and the probe, when persistent) with this HTTP status.
    Status(u32),
    Panic,
}

#[derive(Default)]
struct State {
    bodies: HashMap<String, Vec<u8>>,
    once: HashMap<String, VecDeque<Fault>>,
    always: HashMap<String, Fault>,
    offsets: HashMap<String, Vec<u64>>,
    probes: usize,
    bytes_served: u64,
}

#[derive(Default)]
pub struct FakeFetcher {
    state: Mutex<State>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    gate: Gate,
    hide_length: bool,
    no_ranges: bool,
}

/// Holds every GET once it is counted as in flight, until released.
#[derive(Default)]
struct Gate {
    enabled: bool,
    open: Mutex<bool>,
    opened: Condvar,
}

impl Gate {
    fn wait(&self) {
        if !self.enabled {
            return;
        }
        let mut open = self.open.lock().unwrap_or_else(|p| p.into_inner());
        while !*open {
            open = self.opened.wait(open).unwrap_or_else(|p| p.into_inner());
        }
    }
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every GET blocks after entering flight until [`FakeFetcher::release`].
    pub fn with_gate(mut self) -> Self {
        self.gate.enabled = true;
        self
    }

    /// Opens the gate for every blocked and future GET.
    pub fn release(&self) {
        *self.gate.open.lock().unwrap_or_else(|p| p.into_inner()) = true;
        self.gate.opened.notify_all();
    }

    /// Probe omits `Accept-Ranges: bytes`; ranged GETs still work.
    pub fn without_range_header(mut self) -> Self {
        self.no_ranges = true;
        self
    }

    /// Probe reports no Content-Length.
    pub fn hide_length(mut self) -> Self {
        self.hide_length = true;
        self
    }

    pub fn add(&self, url: &str, body: Vec<u8>) {
        self.state().bodies.insert(url.to_string(), body);
    }

    /// Applies `fault` to the next GET of `url` only.
    pub fn fail_next(&self, url: &str, fault: Fault) {
        self.state()
            .once
            .entry(url.to_string())
            .or_default()
            .push_back(fault);
    }

    /// Applies `fault` to every request of `url`.
    pub fn fail_always(&self, url: &str, fault: Fault) {
        self.state().always.insert(url.to_string(), fault);
    }

    /// Range offsets of every GET of `url`, in order.
    pub fn offsets(&self, url: &str) -> Vec<u64> {
        self.state().offsets.get(url).cloned().unwrap_or_default()
    }

    pub fn fetch_count(&self, url: &str) -> usize {
        self.offsets(url).len()
    }

    pub fn probe_count(&self) -> usize {
        self.state().probes
    }

    pub fn bytes_served(&self) -> u64 {
        self.state().bytes_served
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Polls until `n` GETs are in flight. False on timeout.
    pub fn wait_for_in_flight(&self, n: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.in_flight() < n {
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(Duration::from_millis(2));
        }
        true
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Fetcher for FakeFetcher {
    fn probe(&self, url: &str) -> Result<HeadResult, TransferError> {
        let mut st = self.state();
        st.probes += 1;
        match st.always.get(url).copied() {
            Some(Fault::Status(code)) => return Err(TransferError::Http(code)),
            Some(Fault::Panic) => {
                drop(st);
                panic!("scripted panic for {}", url);
            }
            _ => {}
        }
        let len = st
            .bodies
            .get(url)
            .map(|b| b.len() as u64)
            .ok_or(TransferError::Http(404))?;
        Ok(HeadResult {
            content_length: if self.hide_length { None } else { Some(len) },
            accept_ranges: !self.no_ranges,
        })
    }

    fn fetch_from(
        &self,
        url: &str,
        offset: u64,
        sink: &mut dyn FnMut(&[u8]) -> io::Result<()>,
    ) -> Result<u64, TransferError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);
        self.gate.wait();

        let (fault, body) = {
            let mut st = self.state();
            st.offsets.entry(url.to_string()).or_default().push(offset);
            let once = st.once.get_mut(url).and_then(VecDeque::pop_front);
            let fault = once.or_else(|| st.always.get(url).copied());
            (fault, st.bodies.get(url).cloned())
        };

        let limit = match fault {
            Some(Fault::Status(code)) => return Err(TransferError::Http(code)),
            Some(Fault::Panic) => panic!("scripted panic for {}", url),
            Some(Fault::DropAfter(n)) => Some(n),
            None => None,
        };
        let body = body.ok_or(TransferError::Http(404))?;
        let start = usize::try_from(offset).unwrap_or(usize::MAX);
        if start > body.len() || (start == body.len() && start > 0) {
            return Err(TransferError::Http(416));
        }

        let mut rest = &body[start..];
        if let Some(n) = limit {
            rest = &rest[..rest.len().min(n as usize)];
        }
        let mut delivered = 0u64;
        for chunk in rest.chunks(CHUNK) {
            sink(chunk).map_err(TransferError::Storage)?;
            delivered += chunk.len() as u64;
            self.state().bytes_served += chunk.len() as u64;
        }
        if limit.is_some() {
            return Err(TransferError::Curl(curl::Error::new(CURLE_PARTIAL_FILE)));
        }
        Ok(delivered)
    }
}
