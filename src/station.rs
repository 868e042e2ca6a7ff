//! Host polling loop.
//!
//! Measures on one interval and publishes the latest record on another. The
//! MQTT session lives behind [`Publisher`]; reconnect policy belongs to the
//! publisher implementation, not to this loop.

use std::error;
use std::io::{self, Write};
use std::thread;
use std::time::{Duration, Instant};

use crate::bme280::Bme280;
use crate::bus::Bus;

pub const DEFAULT_TOPIC: &str = "/room_meas";

pub trait Publisher {
    type Error: error::Error + 'static;

    fn publish(&mut self, topic: &str, payload: &str) -> Result<(), Self::Error>;
}

/// Writes `<topic> <payload>` lines, e.g. to feed `mosquitto_pub -l`.
pub struct StdoutPublisher<W: Write> {
    out: W,
}

impl StdoutPublisher<io::Stdout> {
    pub fn new() -> StdoutPublisher<io::Stdout> {
        StdoutPublisher { out: io::stdout() }
    }
}

impl<W: Write> StdoutPublisher<W> {
    pub fn with_writer(out: W) -> StdoutPublisher<W> {
        StdoutPublisher { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Publisher for StdoutPublisher<W> {
    type Error = io::Error;

    fn publish(&mut self, topic: &str, payload: &str) -> io::Result<()> {
        writeln!(self.out, "{} {}", topic, payload)?;
        self.out.flush()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Schedule {
    pub poll_interval: Duration,
    pub publish_interval: Duration,
}

impl Default for Schedule {
    fn default() -> Schedule {
        Schedule {
            poll_interval: Duration::from_secs(5),
            publish_interval: Duration::from_secs(30),
        }
    }
}

/// What a single [`Station::tick`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tick {
    pub polled: bool,
    pub poll_failed: bool,
    pub published: bool,
}

pub struct Station<B: Bus, P: Publisher> {
    sensor: Bme280<B>,
    publisher: P,
    topic: String,
    schedule: Schedule,
    next_poll: Instant,
    next_publish: Instant,
}

impl<B: Bus, P: Publisher> Station<B, P> {
    /// The first poll and publish fall due one interval after `now`.
    pub fn new(sensor: Bme280<B>, publisher: P, topic: &str, schedule: Schedule, now: Instant) -> Station<B, P> {
        Station {
            sensor,
            publisher,
            topic: topic.to_string(),
            schedule,
            next_poll: now + schedule.poll_interval,
            next_publish: now + schedule.publish_interval,
        }
    }

    /// Runs whatever is due at `now`. Polling goes first so a publish in
    /// the same tick carries the fresh record.
    pub fn tick(&mut self, now: Instant) -> Tick {
        let mut tick = Tick::default();

        if now >= self.next_poll {
            tick.polled = true;
            if let Err(e) = self.sensor.read_cycle() {
                tick.poll_failed = true;
                warn!("failed to read bme280 at 0x{:02x}: {}", self.sensor.address(), e);
            }
            self.next_poll = now + self.schedule.poll_interval;
        }

        if now >= self.next_publish {
            match self.sensor.record() {
                Some(record) => match self.publisher.publish(&self.topic, record) {
                    Ok(()) => {
                        debug!("published {} to {}", record, self.topic);
                        tick.published = true;
                    }
                    Err(e) => error!("publish to {} failed: {}", self.topic, e),
                },
                None => warn!("no reading yet, skipping publish to {}", self.topic),
            }
            self.next_publish = now + self.schedule.publish_interval;
        }

        tick
    }

    /// Time left until the earliest deadline.
    pub fn until_next(&self, now: Instant) -> Duration {
        let next = if self.next_poll < self.next_publish {
            self.next_poll
        } else {
            self.next_publish
        };
        if next > now {
            next - now
        } else {
            Duration::from_secs(0)
        }
    }

    pub fn run(&mut self) -> ! {
        loop {
            self.tick(Instant::now());
            thread::sleep(self.until_next(Instant::now()));
        }
    }

    pub fn sensor(&self) -> &Bme280<B> {
        &self.sensor
    }

    pub fn into_parts(self) -> (Bme280<B>, P) {
        (self.sensor, self.publisher)
    }
}
