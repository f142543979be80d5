//! Simulated motorized gimbal
//!
//! An in-process stand-in for the motion controller. Moves complete instantly
//! when waited on. Every call is appended to a shared journal so a dry run
//! (or a test) can check exactly what the session commanded.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::motion::{
    AxisRef, Device, MotionConnection, MotionConnector, MotionError, MotionProfile, MotionResult,
};

/// One call observed by the simulated gimbal.
#[derive(Debug, Clone, PartialEq)]
pub enum MotionEvent {
    Opened { port: String },
    Detected { count: usize },
    Homed { address: u8 },
    MoveIssued {
        axis: AxisRef,
        position_deg: f64,
        profile: MotionProfile,
    },
    Idle { axis: AxisRef, position_deg: f64 },
    Closed { port: String },
}

type Journal = Arc<Mutex<Vec<MotionEvent>>>;

fn lock(journal: &Journal) -> MutexGuard<'_, Vec<MotionEvent>> {
    journal.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Connector for a chain of simulated single-axis rotary devices.
#[derive(Debug, Clone)]
pub struct SimulatedGimbal {
    device_count: u8,
    fault_on_move: Option<usize>,
    journal: Journal,
}

impl SimulatedGimbal {
    /// A chain of `device_count` devices with addresses 1..=device_count.
    pub fn new(device_count: u8) -> Self {
        Self {
            device_count,
            fault_on_move: None,
            journal: Arc::default(),
        }
    }

    /// Make the `n`th issued move (1-based, counted per connection) report a fault.
    pub fn with_fault_on_move(mut self, n: usize) -> Self {
        self.fault_on_move = Some(n);
        self
    }

    /// Snapshot of every event recorded so far.
    pub fn journal(&self) -> Vec<MotionEvent> {
        lock(&self.journal).clone()
    }

    /// Targets of every issued move, in order.
    pub fn issued_moves(&self) -> Vec<(AxisRef, f64)> {
        lock(&self.journal)
            .iter()
            .filter_map(|event| match event {
                MotionEvent::MoveIssued {
                    axis, position_deg, ..
                } => Some((*axis, *position_deg)),
                _ => None,
            })
            .collect()
    }
}

impl Default for SimulatedGimbal {
    /// The motorized gimbal has two devices: field angle then azimuth.
    fn default() -> Self {
        Self::new(2)
    }
}

impl MotionConnector for SimulatedGimbal {
    type Connection = SimulatedConnection;

    fn open(&mut self, port: &str) -> MotionResult<SimulatedConnection> {
        if port.is_empty() {
            return Err(MotionError::Connection {
                port: port.to_string(),
                message: "empty port name".to_string(),
            });
        }

        debug!("Simulated gimbal opened on {port}");
        lock(&self.journal).push(MotionEvent::Opened {
            port: port.to_string(),
        });

        let devices: Vec<Device> = (1..=self.device_count)
            .map(|address| Device { address })
            .collect();
        let axes = devices
            .iter()
            .map(|device| (device.axis(1), AxisState::default()))
            .collect();

        Ok(SimulatedConnection {
            port: port.to_string(),
            devices,
            axes,
            moves_issued: 0,
            fault_on_move: self.fault_on_move,
            journal: Arc::clone(&self.journal),
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct AxisState {
    position_deg: f64,
    target_deg: f64,
}

/// Open connection to the simulated gimbal. Dropping it closes the port.
#[derive(Debug)]
pub struct SimulatedConnection {
    port: String,
    devices: Vec<Device>,
    axes: HashMap<AxisRef, AxisState>,
    moves_issued: usize,
    fault_on_move: Option<usize>,
    journal: Journal,
}

impl SimulatedConnection {
    /// Current (settled) position of an axis.
    pub fn position(&self, axis: AxisRef) -> Option<f64> {
        self.axes.get(&axis).map(|state| state.position_deg)
    }

    fn axis_mut(&mut self, axis: AxisRef) -> MotionResult<&mut AxisState> {
        self.axes.get_mut(&axis).ok_or_else(|| MotionError::Fault {
            address: axis.device_address,
            message: format!("no axis {}", axis.axis_number),
        })
    }
}

impl MotionConnection for SimulatedConnection {
    fn detect_devices(&mut self) -> MotionResult<Vec<Device>> {
        lock(&self.journal).push(MotionEvent::Detected {
            count: self.devices.len(),
        });
        Ok(self.devices.clone())
    }

    fn home_all_axes(&mut self, device: Device) -> MotionResult<()> {
        let state = self.axis_mut(device.axis(1))?;
        state.position_deg = 0.0;
        state.target_deg = 0.0;
        lock(&self.journal).push(MotionEvent::Homed {
            address: device.address,
        });
        Ok(())
    }

    fn move_absolute(
        &mut self,
        axis: AxisRef,
        position_deg: f64,
        profile: &MotionProfile,
    ) -> MotionResult<()> {
        self.moves_issued += 1;
        if self.fault_on_move == Some(self.moves_issued) {
            return Err(MotionError::Fault {
                address: axis.device_address,
                message: format!("simulated fault on move {}", self.moves_issued),
            });
        }

        self.axis_mut(axis)?.target_deg = position_deg;
        lock(&self.journal).push(MotionEvent::MoveIssued {
            axis,
            position_deg,
            profile: *profile,
        });
        Ok(())
    }

    fn wait_until_idle(&mut self, axis: AxisRef) -> MotionResult<()> {
        let state = self.axis_mut(axis)?;
        state.position_deg = state.target_deg;
        let position_deg = state.position_deg;
        lock(&self.journal).push(MotionEvent::Idle { axis, position_deg });
        Ok(())
    }
}

impl Drop for SimulatedConnection {
    fn drop(&mut self) {
        debug!("Simulated gimbal closed on {}", self.port);
        lock(&self.journal).push(MotionEvent::Closed {
            port: self.port.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_configured_devices() {
        let mut gimbal = SimulatedGimbal::new(3);
        let mut conn = gimbal.open("COM4").unwrap();
        let devices = conn.detect_devices().unwrap();
        let addresses: Vec<_> = devices.iter().map(|d| d.address).collect();
        assert_eq!(addresses, vec![1, 2, 3]);
    }

    #[test]
    fn test_move_settles_on_wait() {
        let mut gimbal = SimulatedGimbal::default();
        let mut conn = gimbal.open("COM4").unwrap();
        let axis = Device { address: 1 }.axis(1);

        conn.move_absolute(axis, 30.0, &MotionProfile::default())
            .unwrap();
        assert_eq!(conn.position(axis), Some(0.0));

        conn.wait_until_idle(axis).unwrap();
        assert_eq!(conn.position(axis), Some(30.0));
    }

    #[test]
    fn test_unknown_axis_faults() {
        let mut gimbal = SimulatedGimbal::default();
        let mut conn = gimbal.open("COM4").unwrap();
        let axis = Device { address: 9 }.axis(1);

        let err = conn
            .move_absolute(axis, 1.0, &MotionProfile::default())
            .unwrap_err();
        assert!(matches!(err, MotionError::Fault { address: 9, .. }));
    }

    #[test]
    fn test_injected_fault() {
        let mut gimbal = SimulatedGimbal::default().with_fault_on_move(2);
        let mut conn = gimbal.open("COM4").unwrap();
        let axis = Device { address: 1 }.axis(1);
        let profile = MotionProfile::default();

        assert!(conn.move_absolute(axis, 1.0, &profile).is_ok());
        assert!(conn.move_absolute(axis, 2.0, &profile).is_err());
        assert!(conn.move_absolute(axis, 3.0, &profile).is_ok());
    }

    #[test]
    fn test_drop_closes_connection() {
        let mut gimbal = SimulatedGimbal::default();
        {
            let _conn = gimbal.open("COM7").unwrap();
        }
        assert_eq!(
            gimbal.journal(),
            vec![
                MotionEvent::Opened {
                    port: "COM7".to_string()
                },
                MotionEvent::Closed {
                    port: "COM7".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_empty_port_rejected() {
        let mut gimbal = SimulatedGimbal::default();
        assert!(matches!(
            gimbal.open(""),
            Err(MotionError::Connection { .. })
        ));
    }
}
