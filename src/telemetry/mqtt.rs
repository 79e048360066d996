/// MQTT subscription that forwards rain sensor messages to the ingestion task
use log::{debug, error, info, warn};
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS, SubscribeReasonCode, Transport};
use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};

use crate::config::MqttConfig;
use crate::error::RainError;
use crate::telemetry::parser::{Channel, TelemetryMessage};

const KEEP_ALIVE_SECS: u64 = 30;
const REQUEST_CAPACITY: usize = 10;

/// Topic names of the two sensor channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topics {
    pub presence: String,
    pub detail: String,
}

impl Topics {
    pub fn from_config(config: &MqttConfig) -> Self {
        Topics {
            presence: config.presence_topic.clone(),
            detail: config.detail_topic.clone(),
        }
    }

    /// Map a topic to its channel; unknown topics yield `None`
    pub fn classify(&self, topic: &str) -> Option<Channel> {
        if topic == self.presence {
            Some(Channel::Presence)
        } else if topic == self.detail {
            Some(Channel::Detail)
        } else {
            None
        }
    }

    fn all(&self) -> [&str; 2] {
        [self.presence.as_str(), self.detail.as_str()]
    }
}

fn mqtt_options(config: &MqttConfig) -> MqttOptions {
    let mut options = MqttOptions::new(&config.client_id, &config.host, config.port);
    options.set_keep_alive(Duration::from_secs(KEEP_ALIVE_SECS));

    if let Some(credentials) = &config.credentials {
        options.set_credentials(&credentials.username, &credentials.password);
    }

    if config.use_tls {
        options.set_transport(Transport::tls_with_default_config());
    }

    options
}

/// Connect to the broker and forward sensor messages into `tx`
///
/// Subscriptions are (re)issued on every ConnAck, so they survive broker
/// reconnects. Connection errors are logged and followed by a pause before
/// the next poll; rumqttc reconnects on that poll. This function never
/// touches the rain status itself.
///
/// # Returns
/// Ok once the receiving side of `tx` has gone away
pub async fn run_mqtt_ingress(
    config: &MqttConfig,
    tx: mpsc::Sender<TelemetryMessage>,
) -> Result<(), RainError> {
    let topics = Topics::from_config(config);
    let (client, mut eventloop) = AsyncClient::new(mqtt_options(config), REQUEST_CAPACITY);

    info!("Connecting to MQTT broker {}:{}", config.host, config.port);

    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                info!("Connected to MQTT broker {}", config.host);
                for topic in topics.all() {
                    match client.subscribe(topic, QoS::AtMostOnce).await {
                        Ok(()) => info!("Subscribed to {}", topic),
                        Err(e) => error!(
                            "Failed to subscribe to {}: {}",
                            topic,
                            RainError::from(e)
                        ),
                    }
                }
            }
            Ok(Event::Incoming(Packet::SubAck(ack))) => {
                if ack
                    .return_codes
                    .iter()
                    .any(|code| matches!(code, SubscribeReasonCode::Failure))
                {
                    error!("Broker rejected subscription (packet {})", ack.pkid);
                }
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                let Some(channel) = topics.classify(&publish.topic) else {
                    warn!("Ignoring message on unexpected topic {}", publish.topic);
                    continue;
                };

                debug!(
                    "Received on {}: {}",
                    publish.topic,
                    String::from_utf8_lossy(&publish.payload)
                );

                if tx
                    .send(TelemetryMessage::new(channel, publish.payload.to_vec()))
                    .await
                    .is_err()
                {
                    info!("Ingestion stopped, closing MQTT ingress");
                    return Ok(());
                }
            }
            Ok(_) => {}
            Err(e) => {
                error!("{}", RainError::from(e));
                sleep(config.reconnect_delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topics() -> Topics {
        Topics {
            presence: "RainSensorData".to_string(),
            detail: "RainSensorData/aiData".to_string(),
        }
    }

    #[test]
    fn classifies_configured_topics() {
        let topics = topics();
        assert_eq!(topics.classify("RainSensorData"), Some(Channel::Presence));
        assert_eq!(topics.classify("RainSensorData/aiData"), Some(Channel::Detail));
    }

    #[test]
    fn unknown_topics_are_not_classified() {
        let topics = topics();
        assert_eq!(topics.classify("RainSensorData/other"), None);
        assert_eq!(topics.classify("rainsensordata"), None);
    }
}
