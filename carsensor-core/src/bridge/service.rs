//! Bus service and supervision
//!
//! Two stages run concurrently for each bridge instance:
//!
//! - the bus stage sits on [`I2cTarget::wait_for_event`], classifies the
//!   event by shape and hands it over. For a Request it waits for the reply
//!   and puts it on the wire.
//! - the decode stage owns the [`RegisterBridge`], folds in status bytes from
//!   acquisition, applies events and forwards expander writes.
//!
//! The bus stage never runs register semantics. A Request waits at most the
//! reply timeout before the sentinel goes out; the Request is then marked
//! abandoned, and the decode stage drops it without reading the register, so
//! sticky sensor bits stay latched for the next read. Writes queue up to
//! `EVENT_QUEUE_DEPTH` events ahead of the decode stage. Past that the bus
//! stage waits for room, which a stalled expander forward bounds by the
//! forward timeout.

use core::cell::Cell;
use core::convert::Infallible;

use carsensor_hal::{ActuatorPin, I2cTarget};
use carsensor_protocol::{BusEvent, EventDecoder, Reply, RAW_EVENT_BUF};
use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::{NoopRawMutex, RawMutex};
use embassy_sync::channel::Channel;
use embassy_time::{with_timeout, Timer};

use super::state::{EventTrace, Outcome, RegisterBridge};
use crate::config::LinkTiming;
use crate::dispatch::{forward_output, OutputQueue};
use crate::link::Rendezvous;

/// Why a bridge instance stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BridgeError<E> {
    /// The peripheral could not be put into target mode
    Configure(E),
    /// Waiting for or answering an event failed
    Bus(E),
}

/// Channels connecting the bridge to the other loops
pub struct BridgeLinks<'a, M: RawMutex> {
    /// Status bytes from acquisition
    pub status: &'a Rendezvous<M, u8>,
    /// Expander writes for the dispatcher
    pub outputs: &'a OutputQueue<M>,
    pub timing: LinkTiming,
}

/// Events the bus stage may run ahead of the decode stage
const EVENT_QUEUE_DEPTH: usize = 4;

/// An event on its way to the decode stage
///
/// Requests carry the ticket the bus stage waits on.
#[derive(Debug, Clone, Copy)]
struct Staged {
    event: BusEvent,
    ticket: Option<u32>,
}

/// Shared state between the bus stage and the decode stage
struct Handoff {
    events: Channel<NoopRawMutex, Staged, EVENT_QUEUE_DEPTH>,
    replies: Channel<NoopRawMutex, Reply, 1>,
    /// Ticket of the Request the bus stage is still waiting to answer
    awaited: Cell<Option<u32>>,
}

impl Handoff {
    fn new() -> Self {
        Self {
            events: Channel::new(),
            replies: Channel::new(),
            awaited: Cell::new(None),
        }
    }

    /// True if the bus stage gave up on the Request holding `ticket`
    fn is_abandoned(&self, ticket: Option<u32>) -> bool {
        ticket.is_some() && self.awaited.get() != ticket
    }
}

/// Serve the host until the bus fails
pub async fn listen<T, M, P>(
    target: &mut T,
    bridge: &mut RegisterBridge<P>,
    links: &BridgeLinks<'_, M>,
) -> BridgeError<T::Error>
where
    T: I2cTarget,
    M: RawMutex,
    P: ActuatorPin,
{
    if let Err(e) = target.listen().await {
        return BridgeError::Configure(e);
    }

    #[cfg(feature = "defmt")]
    defmt::info!("Listening on {=u8:#04x}", target.address());

    let handoff = Handoff::new();

    match select(
        serve_bus(target, &handoff, links.timing),
        decode(bridge, &handoff, links),
    )
    .await
    {
        Either::First(Err(e)) => BridgeError::Bus(e),
        Either::First(Ok(never)) => match never {},
        Either::Second(never) => match never {},
    }
}

/// Restart the bridge forever, keeping its state across restarts
///
/// `on_error` sees every failure before the backoff starts.
pub async fn supervise<T, M, P, F>(
    target: &mut T,
    bridge: &mut RegisterBridge<P>,
    links: &BridgeLinks<'_, M>,
    mut on_error: F,
) -> Infallible
where
    T: I2cTarget,
    M: RawMutex,
    P: ActuatorPin,
    F: FnMut(&BridgeError<T::Error>),
{
    loop {
        let error = listen(target, bridge, links).await;
        on_error(&error);
        Timer::after(links.timing.restart_backoff).await;
    }
}

async fn serve_bus<T: I2cTarget>(
    target: &mut T,
    handoff: &Handoff,
    timing: LinkTiming,
) -> Result<Infallible, T::Error> {
    let mut decoder = EventDecoder::new();
    let mut buf = [0u8; RAW_EVENT_BUF];
    let mut next_ticket = 0u32;

    loop {
        let (kind, len) = target.wait_for_event(&mut buf).await?;
        let event = decoder.decode(kind, &buf[..len.min(RAW_EVENT_BUF)]);

        let BusEvent::Request { .. } = event else {
            handoff.events.send(Staged { event, ticket: None }).await;
            continue;
        };

        let ticket = next_ticket;
        next_ticket = next_ticket.wrapping_add(1);

        // A reply that missed its deadline must not answer this read
        while handoff.replies.try_receive().is_ok() {}
        handoff.awaited.set(Some(ticket));
        let answer = async {
            let staged = Staged {
                event,
                ticket: Some(ticket),
            };
            handoff.events.send(staged).await;
            handoff.replies.receive().await
        };

        let result = with_timeout(timing.reply_timeout, answer).await;
        handoff.awaited.set(None);
        let reply = match result {
            Ok(reply) => reply,
            Err(_) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("No reply for {=u8:#04x} in time", decoder.addressed());
                Reply::sentinel()
            }
        };
        target.reply(reply.as_bytes()).await?;
    }
}

async fn decode<M: RawMutex, P: ActuatorPin>(
    bridge: &mut RegisterBridge<P>,
    handoff: &Handoff,
    links: &BridgeLinks<'_, M>,
) -> Infallible {
    let mut trace = EventTrace::new();
    loop {
        let staged = match select(links.status.receive(), handoff.events.receive()).await {
            Either::First(raw) => {
                if bridge.observe_status(raw) {
                    #[cfg(feature = "defmt")]
                    defmt::debug!("Sensor status {=u8:#010b}", raw);
                }
                continue;
            }
            Either::Second(staged) => staged,
        };
        let event = staged.event;

        // The host already got the sentinel for this Request
        if handoff.is_abandoned(staged.ticket) {
            #[cfg(feature = "defmt")]
            defmt::debug!("Dropped late {}", event);
            continue;
        }

        if trace.is_new(&event) {
            #[cfg(feature = "defmt")]
            defmt::debug!("Bus {}", event);
        }

        match bridge.handle(event) {
            Outcome::Idle => {}
            Outcome::Reply(reply) => {
                let _ = handoff.replies.try_send(reply);
            }
            Outcome::Forward(request) => {
                if !forward_output(links.outputs, request, links.timing.forward_timeout).await {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("Output queue full, dropped {}", request);
                }
            }
            Outcome::Ignored(_register) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("Ignored write to {=u8:#04x}", _register);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::BridgeContext;
    use crate::config::{AddressKind, BoardDescription, ACTUATOR_PINS};
    use crate::dispatch::{OutputDispatcher, OutputRequest, OUTPUT_QUEUE_DEPTH};
    use crate::mocks::{MockBusError, MockExpander, MockPin, MockTarget, ReplyLog, Script};
    use carsensor_hal::TargetEvent;
    use embassy_time::Duration;

    fn timing() -> LinkTiming {
        LinkTiming {
            forward_timeout: Duration::from_millis(100),
            reply_timeout: Duration::from_millis(30),
            restart_backoff: Duration::from_millis(20),
        }
    }

    struct Harness {
        script: Script,
        replies: ReplyLog,
        status: Rendezvous<NoopRawMutex, u8>,
        outputs: OutputQueue<NoopRawMutex>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                script: Script::new(),
                replies: ReplyLog::new(),
                status: Rendezvous::new(),
                outputs: OutputQueue::new(),
            }
        }

        fn links(&self) -> BridgeLinks<'_, NoopRawMutex> {
            BridgeLinks {
                status: &self.status,
                outputs: &self.outputs,
                timing: timing(),
            }
        }

        fn target(&self) -> MockTarget<'_> {
            MockTarget::new(&self.script, &self.replies)
        }

        async fn read(&self, register: u8) -> heapless::Vec<u8, 2> {
            self.script.send(MockTarget::receive(&[register])).await;
            self.script.send(MockTarget::event(TargetEvent::Request)).await;
            self.script.send(MockTarget::event(TargetEvent::Finish)).await;
            self.replies.receive().await
        }

        async fn write(&self, register: u8, value: u8) {
            self.script.send(MockTarget::receive(&[register, value])).await;
            self.script.send(MockTarget::event(TargetEvent::Finish)).await;
        }
    }

    fn bridge(converters: usize, expanders: usize) -> RegisterBridge<MockPin> {
        let ctx = BridgeContext::new(
            &BoardDescription::BINKY_CAR_SENSOR,
            AddressKind::Primary,
            converters,
            expanders,
            65_103,
        );
        RegisterBridge::new(ctx, [MockPin::default(); ACTUATOR_PINS])
    }

    #[tokio::test]
    async fn test_counts_with_two_converters_no_expanders() {
        let h = Harness::new();
        let links = h.links();
        let mut target = h.target();
        let mut b = bridge(2, 0);

        let host = async {
            assert_eq!(h.read(0x03).await.as_slice(), [8]);
            assert_eq!(h.read(0x04).await.as_slice(), [0]);
            assert_eq!(h.read(0x77).await.as_slice(), [0xFF, 0xFF]);
        };
        match select(listen(&mut target, &mut b, &links), host).await {
            Either::First(e) => panic!("bridge stopped: {:?}", e),
            Either::Second(()) => {}
        }
        assert_eq!(target.listens, 1);
    }

    #[tokio::test]
    async fn test_sticky_status_through_bridge() {
        let h = Harness::new();
        let links = h.links();
        let mut target = h.target();
        let mut b = bridge(1, 0);

        let host = async {
            // Channel 3 turns active, then inactive before the host polls
            h.status.send(0b0000_1000).await;
            h.status.send(0).await;
            assert_eq!(h.read(0x10).await.as_slice(), [0b0000_1000]);
            assert_eq!(h.read(0x10).await.as_slice(), [0]);
        };
        match select(listen(&mut target, &mut b, &links), host).await {
            Either::First(e) => panic!("bridge stopped: {:?}", e),
            Either::Second(()) => {}
        }
    }

    #[tokio::test]
    async fn test_pwm_then_digital_write() {
        let h = Harness::new();
        let links = h.links();
        let mut target = h.target();
        let mut b = bridge(1, 0);

        let host = async {
            h.write(0x31, 200).await;
            h.write(0x20, 0b0000_0010).await;
            // A read round-trip guarantees both writes were decoded
            h.read(0x00).await;
        };
        match select(listen(&mut target, &mut b, &links), host).await {
            Either::First(e) => panic!("bridge stopped: {:?}", e),
            Either::Second(()) => {}
        }
        let pin = b.pins()[1];
        assert_eq!(pin.compare, Some(50_861));
        assert!(!pin.high);
        assert_eq!(pin.writes, 0);
    }

    #[tokio::test]
    async fn test_remote_writes_reach_dispatcher() {
        let h = Harness::new();
        let links = h.links();
        let mut target = h.target();
        let mut b = bridge(1, 1);
        let mut dispatcher = OutputDispatcher::new([MockExpander::new(0x20)].into_iter().collect());

        let host = async {
            h.write(0x21, 0x0F).await;
            h.write(0x22, 0xF0).await;
            h.write(0x21, 0x01).await;
            h.read(0x00).await;
            Timer::after(Duration::from_millis(10)).await;
        };
        let service = select(listen(&mut target, &mut b, &links), dispatcher.run(&h.outputs));
        match select(service, host).await {
            Either::First(_) => panic!("service stopped"),
            Either::Second(()) => {}
        }
        // Device 1 was never detected, its write is dropped
        assert_eq!(dispatcher.expanders()[0].writes.as_slice(), [0x0F, 0x01]);
    }

    #[tokio::test]
    async fn test_late_reply_becomes_sentinel() {
        let h = Harness::new();
        let links = h.links();
        let mut target = h.target();
        let mut b = bridge(1, 1);

        // Nobody drains the queue, so the next forward stalls the decode stage
        for value in 0..OUTPUT_QUEUE_DEPTH as u8 {
            h.outputs.try_send(OutputRequest { device: 0, value }).unwrap();
        }

        let host = async {
            h.write(0x21, 0xAA).await;
            let reply = h.read(0x01).await;
            assert_eq!(reply.as_slice(), [0xFF, 0xFF]);

            // Once the forward gives up, reads are answered normally again
            Timer::after(Duration::from_millis(150)).await;
            assert_eq!(h.read(0x02).await.as_slice(), [1]);
        };
        match select(listen(&mut target, &mut b, &links), host).await {
            Either::First(e) => panic!("bridge stopped: {:?}", e),
            Either::Second(()) => {}
        }
        assert_eq!(h.outputs.len(), OUTPUT_QUEUE_DEPTH);
    }

    #[tokio::test]
    async fn test_late_sensor_read_keeps_activation() {
        let h = Harness::new();
        let links = h.links();
        let mut target = h.target();
        let mut b = bridge(1, 1);

        for value in 0..OUTPUT_QUEUE_DEPTH as u8 {
            h.outputs.try_send(OutputRequest { device: 0, value }).unwrap();
        }

        let host = async {
            h.status.send(0b0000_1000).await;
            h.status.send(0).await;
            // The forward stalls the decode stage past the reply deadline
            h.write(0x21, 0x55).await;
            assert_eq!(h.read(0x10).await.as_slice(), [0xFF, 0xFF]);

            Timer::after(Duration::from_millis(150)).await;
            assert_eq!(h.read(0x10).await.as_slice(), [0b0000_1000]);
            assert_eq!(h.read(0x10).await.as_slice(), [0]);
        };
        match select(listen(&mut target, &mut b, &links), host).await {
            Either::First(e) => panic!("bridge stopped: {:?}", e),
            Either::Second(()) => {}
        }
    }

    #[tokio::test]
    async fn test_writes_behind_stalled_forward_are_kept() {
        let h = Harness::new();
        let links = h.links();
        let mut target = h.target();
        let mut b = bridge(1, 1);

        for value in 0..OUTPUT_QUEUE_DEPTH as u8 {
            h.outputs.try_send(OutputRequest { device: 0, value }).unwrap();
        }

        let host = async {
            h.write(0x21, 0xAA).await;
            // More events than the handoff queue holds
            h.write(0x31, 200).await;
            h.write(0x32, 100).await;
            h.write(0x33, 50).await;
            h.write(0x20, 0b1000_0001).await;

            Timer::after(Duration::from_millis(150)).await;
            assert_eq!(h.read(0x02).await.as_slice(), [1]);
        };
        match select(listen(&mut target, &mut b, &links), host).await {
            Either::First(e) => panic!("bridge stopped: {:?}", e),
            Either::Second(()) => {}
        }
        assert!(b.state().is_pwm(1));
        assert!(b.state().is_pwm(2));
        assert!(b.state().is_pwm(3));
        assert!(b.pins()[7].high);
    }

    #[test]
    fn test_handoff_marks_unawaited_requests() {
        let handoff = Handoff::new();
        assert!(!handoff.is_abandoned(None));
        assert!(handoff.is_abandoned(Some(0)));

        handoff.awaited.set(Some(3));
        assert!(!handoff.is_abandoned(Some(3)));
        assert!(handoff.is_abandoned(Some(2)));
        assert!(!handoff.is_abandoned(None));
    }

    #[tokio::test]
    async fn test_bus_error_stops_bridge() {
        let h = Harness::new();
        let links = h.links();
        let mut target = h.target();
        let mut b = bridge(1, 0);

        h.script.try_send(Err(MockBusError)).unwrap();
        assert_eq!(
            listen(&mut target, &mut b, &links).await,
            BridgeError::Bus(MockBusError)
        );

        target.fail_listen = true;
        assert_eq!(
            listen(&mut target, &mut b, &links).await,
            BridgeError::Configure(MockBusError)
        );
    }

    #[tokio::test]
    async fn test_supervisor_restarts_and_keeps_state() {
        let h = Harness::new();
        let links = h.links();
        let mut target = h.target();
        let mut b = bridge(1, 0);
        let mut errors = 0u32;

        let host = async {
            h.write(0x32, 64).await;
            h.read(0x00).await;
            h.script.send(Err(MockBusError)).await;
            // After the backoff the restarted bridge still knows pin 2 is PWM
            h.write(0x20, 0b0000_0100).await;
            h.read(0x00).await;
        };
        match select(supervise(&mut target, &mut b, &links, |_| errors += 1), host).await {
            Either::First(never) => match never {},
            Either::Second(()) => {}
        }
        assert_eq!(errors, 1);
        assert_eq!(target.listens, 2);
        assert!(b.state().is_pwm(2));
        assert!(!b.pins()[2].high);
    }
}
