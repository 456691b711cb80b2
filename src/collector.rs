//! Reassembly of concatenated TPDUs: per-conversation buffering,
//! duplicate/out-of-order tolerance, and bounded expiry (spec §4.11, §5).

use crate::error::CollectorError;
use crate::tpdu::{Direction, SmsType, Tpdu};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

pub type ExpiryHandler = Box<dyn Fn(Vec<Option<Tpdu>>) + Send + Sync>;

fn sms_type_tag(t: SmsType) -> u8 {
    match t {
        SmsType::Deliver => 0,
        SmsType::DeliverReport => 1,
        SmsType::Submit => 2,
        SmsType::SubmitReport => 3,
        SmsType::StatusReport => 4,
        SmsType::Command => 5,
    }
}

/// `(smsType, toa, address, concatRef, totalSegments)` (spec §4.11).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct PipeKey {
    sms_type: u8,
    ton: u8,
    npi: u8,
    addr: String,
    reference: u16,
    total: u8,
}

struct Pipe {
    slots: Vec<Option<Tpdu>>,
    filled: usize,
    /// Bumped every time the pipe's timer is (re)started, so a stale
    /// timer firing after a restart is a no-op (spec §5's race rule).
    generation: u64,
}

struct Shared {
    pipes: Mutex<HashMap<PipeKey, Pipe>>,
    timers: Mutex<BinaryHeap<(Reverse<Instant>, PipeKey, u64)>>,
    closed: Mutex<bool>,
    cv: Condvar,
    timeout: Duration,
    expiry_handler: Option<ExpiryHandler>,
}

/// A shared, thread-safe buffer of in-flight multi-segment conversations.
pub struct Collector {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl Collector {
    pub fn new(timeout: Duration, expiry_handler: Option<ExpiryHandler>) -> Self {
        let shared = Arc::new(Shared {
            pipes: Mutex::new(HashMap::new()),
            timers: Mutex::new(BinaryHeap::new()),
            closed: Mutex::new(false),
            cv: Condvar::new(),
            timeout,
            expiry_handler,
        });
        let worker_shared = Arc::clone(&shared);
        let worker = thread::spawn(move || Self::run(worker_shared));
        Collector { shared, worker: Some(worker) }
    }

    fn run(shared: Arc<Shared>) {
        loop {
            let mut timers = shared.timers.lock().unwrap();
            if *shared.closed.lock().unwrap() {
                return;
            }
            match timers.peek() {
                None => {
                    let (guard, timeout) = shared.cv.wait_timeout(timers, Duration::from_secs(3600)).unwrap();
                    drop(guard);
                    let _ = timeout;
                }
                Some(&(Reverse(deadline), _, _)) => {
                    let now = Instant::now();
                    if deadline <= now {
                        let (_, key, generation) = timers.pop().unwrap();
                        drop(timers);
                        Self::fire(&shared, key, generation);
                    } else {
                        let wait_for = deadline - now;
                        let (guard, _) = shared.cv.wait_timeout(timers, wait_for).unwrap();
                        drop(guard);
                    }
                }
            }
        }
    }

    fn fire(shared: &Shared, key: PipeKey, generation: u64) {
        let mut pipes = shared.pipes.lock().unwrap();
        let expired = match pipes.get(&key) {
            Some(pipe) if pipe.generation == generation => pipes.remove(&key),
            _ => None,
        };
        drop(pipes);
        if let Some(pipe) = expired {
            log::debug!("reassembly pipe expired with {}/{} segments", pipe.filled, pipe.slots.len());
            if let Some(handler) = &shared.expiry_handler {
                handler(pipe.slots);
            }
        }
    }

    fn schedule(&self, key: PipeKey, generation: u64) {
        let deadline = Instant::now() + self.shared.timeout;
        self.shared.timers.lock().unwrap().push((Reverse(deadline), key, generation));
        self.shared.cv.notify_all();
    }

    /// Feeds one arriving TPDU in. Returns `Some(segments)` immediately for
    /// non-concatenated traffic or once a conversation completes; `None`
    /// while a conversation is still pending (spec §4.11).
    pub fn collect(&self, tpdu: Tpdu) -> Result<Option<Vec<Tpdu>>, CollectorError> {
        if *self.shared.closed.lock().unwrap() {
            return Err(CollectorError::Closed);
        }

        let concat = tpdu.ud.as_ref().and_then(|u| u.header.concat_info());
        let concat = match concat {
            Some(c) if c.total >= 2 => c,
            _ => return Ok(Some(vec![tpdu])),
        };
        if concat.seqno < 1 || concat.seqno > concat.total {
            return Err(CollectorError::ReassemblyInconsistency);
        }

        let address = match tpdu.sms_type.direction() {
            Direction::Mt => tpdu.oa.as_ref(),
            Direction::Mo => tpdu.da.as_ref(),
        }
        .ok_or(CollectorError::ReassemblyInconsistency)?;

        let key = PipeKey {
            sms_type: sms_type_tag(tpdu.sms_type),
            ton: address.ton,
            npi: address.npi,
            addr: address.addr.clone(),
            reference: concat.reference,
            total: concat.total,
        };
        let idx = (concat.seqno - 1) as usize;

        let mut pipes = self.shared.pipes.lock().unwrap();
        if let Some(pipe) = pipes.get_mut(&key) {
            if pipe.slots[idx].is_some() {
                return Err(CollectorError::DuplicateSegment);
            }
            pipe.slots[idx] = Some(tpdu);
            pipe.filled += 1;
            if pipe.filled == pipe.slots.len() {
                let pipe = pipes.remove(&key).unwrap();
                drop(pipes);
                return Ok(Some(pipe.slots.into_iter().map(|s| s.unwrap()).collect()));
            }
            pipe.generation += 1;
            let generation = pipe.generation;
            drop(pipes);
            self.schedule(key, generation);
            Ok(None)
        } else {
            let mut slots = vec![None; concat.total as usize];
            slots[idx] = Some(tpdu);
            pipes.insert(key.clone(), Pipe { slots, filled: 1, generation: 0 });
            drop(pipes);
            self.schedule(key, 0);
            Ok(None)
        }
    }

    /// Idempotent: marks the collector closed and cancels all timers.
    pub fn close(&self) {
        let mut closed = self.shared.closed.lock().unwrap();
        if *closed {
            return;
        }
        *closed = true;
        drop(closed);
        self.shared.timers.lock().unwrap().clear();
        self.shared.cv.notify_all();
    }
}

impl Drop for Collector {
    fn drop(&mut self) {
        self.close();
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Address;
    use crate::dcs::Dcs;
    use crate::udh::{InformationElement, UserDataHeader, IE_CONCAT_8BIT};
    use crate::userdata::UserData;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn deliver_with_concat(oa: &str, reference: u8, total: u8, seqno: u8) -> Tpdu {
        let mut header = UserDataHeader::new();
        header.push(InformationElement::new(IE_CONCAT_8BIT, vec![reference, total, seqno]));
        let (mut t, _) = Tpdu::decode(&[0x00, 0x0b, 0x91, 0x16, 0x05, 0x93, 0x57, 0x13, 0xf2, 0x00, 0x00, 0x81, 0x40, 0x80, 0x61, 0x13, 0x91, 0x23, 0x00], crate::tpdu::Direction::Mt).unwrap();
        t.sms_type = SmsType::Deliver;
        t.oa = Some(Address::international(oa));
        t.dcs = Some(Dcs::default_7bit());
        t.ud = Some(UserData { header, alphabet: crate::dcs::Alphabet::Bit7, body: vec![] });
        t
    }

    #[test]
    fn non_concatenated_tpdu_short_circuits() {
        let collector = Collector::new(Duration::from_secs(60), None);
        let tpdu = deliver_with_concat("1234", 0, 1, 1); // total<2 => no concat
        let result = collector.collect(tpdu).unwrap();
        assert_eq!(result.unwrap().len(), 1);
    }

    #[test]
    fn two_segments_complete_the_conversation() {
        let collector = Collector::new(Duration::from_secs(60), None);
        let first = collector.collect(deliver_with_concat("+1234", 5, 2, 1)).unwrap();
        assert!(first.is_none());
        let second = collector.collect(deliver_with_concat("+1234", 5, 2, 2)).unwrap();
        assert_eq!(second.unwrap().len(), 2);
    }

    #[test]
    fn repeat_after_completion_opens_a_new_pipe() {
        let collector = Collector::new(Duration::from_secs(60), None);
        collector.collect(deliver_with_concat("+1234", 5, 2, 1)).unwrap();
        collector.collect(deliver_with_concat("+1234", 5, 2, 2)).unwrap();
        let result = collector.collect(deliver_with_concat("+1234", 5, 2, 1)).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn duplicate_slot_before_completion_errors() {
        let collector = Collector::new(Duration::from_secs(60), None);
        collector.collect(deliver_with_concat("+1234", 7, 3, 1)).unwrap();
        let err = collector.collect(deliver_with_concat("+1234", 7, 3, 1));
        assert_eq!(err, Err(CollectorError::DuplicateSegment));
    }

    #[test]
    fn out_of_range_seqno_is_rejected() {
        let collector = Collector::new(Duration::from_secs(60), None);
        let err = collector.collect(deliver_with_concat("+1234", 1, 2, 0));
        assert_eq!(err, Err(CollectorError::ReassemblyInconsistency));
    }

    #[test]
    fn closed_collector_rejects_further_segments() {
        let collector = Collector::new(Duration::from_secs(60), None);
        collector.close();
        collector.close(); // idempotent
        let err = collector.collect(deliver_with_concat("+1234", 1, 2, 1));
        assert_eq!(err, Err(CollectorError::Closed));
    }

    #[test]
    fn expiry_handler_runs_once_with_partial_segments() {
        let seen = Arc::new(AtomicUsize::new(0));
        let seen2 = Arc::clone(&seen);
        let collector = Collector::new(
            Duration::from_millis(20),
            Some(Box::new(move |slots: Vec<Option<Tpdu>>| {
                assert_eq!(slots.len(), 2);
                assert!(slots[0].is_some());
                assert!(slots[1].is_none());
                seen2.fetch_add(1, Ordering::SeqCst);
            })),
        );
        collector.collect(deliver_with_concat("+1234", 9, 2, 1)).unwrap();
        thread::sleep(Duration::from_millis(200));
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }
}
