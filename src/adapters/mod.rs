//! Adapters — concrete implementations of the port traits.
//!
//! | Adapter     | Implements      | Connects to                        |
//! |-------------|-----------------|------------------------------------|
//! | `uart`      | CommandChannel  | any `embedded-io` serial port      |
//! | `pwm`       | ActuatorSink    | any `embedded-hal` PWM channel     |
//! | `sensor`    | SensorSource    | NTC thermistor on a raw ADC        |
//! | `log_sink`  | Logger          | `log` facade                       |
//! | `sim`       | CommandChannel  | SPSC RX FIFO (host simulation)     |
//! |             | SensorSource    | drifting scalar (host simulation)  |
//! |             | SetDutyCycle    | in-memory PWM (host simulation)    |

pub mod log_sink;
pub mod pwm;
pub mod sensor;
pub mod sim;
pub mod uart;
