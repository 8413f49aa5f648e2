//! Typed helpers over `MessageBus`.
//!
//! The bus carries `serde_json::Value`. These helpers convert to and from
//! caller types with serde so modules can exchange their own structs.

use crate::bus::MessageBus;
use crate::error::BusError;
use crate::handler::Handler;
use crate::subscription::Subscription;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Serde conversions for any `MessageBus`.
pub trait MessageBusExt: MessageBus {
    /// Serialize `payload` and publish it.
    ///
    /// # Errors
    ///
    /// `BusError::Serialization` if `payload` cannot be converted, or any
    /// error from `publish`.
    fn publish_as<T: Serialize>(&self, name: &str, payload: &T) -> Result<(), BusError> {
        let value = serde_json::to_value(payload)?;
        self.publish(name, value)
    }

    /// Subscribe with a callback taking `T`. A payload that does not
    /// deserialize into `T` counts as a failed delivery for that handler.
    ///
    /// # Errors
    ///
    /// Any error from `subscribe`.
    fn subscribe_as<T, F>(&self, name: &str, callback: F) -> Result<Subscription, BusError>
    where
        T: DeserializeOwned,
        F: Fn(T) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.subscribe(
            name,
            Handler::new(move |value: &Value| {
                let typed = T::deserialize(value)?;
                callback(typed)
            }),
        )
    }

    /// Serialize `value` and store it under `key`.
    ///
    /// # Errors
    ///
    /// `BusError::Serialization` if `value` cannot be converted, or any
    /// error from `set_state`.
    fn set_state_as<T: Serialize>(&self, key: &str, value: &T) -> Result<(), BusError> {
        let value = serde_json::to_value(value)?;
        self.set_state(key, value)
    }

    /// Read `key` as `T`.
    ///
    /// # Errors
    ///
    /// `BusError::Serialization` if the stored value does not fit `T`, or
    /// any error from `get_state`.
    fn get_state_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, BusError> {
        self.get_state(key)?
            .map(serde_json::from_value)
            .transpose()
            .map_err(BusError::from)
    }

    /// Watch `key` with a callback taking `T`.
    ///
    /// # Errors
    ///
    /// Any error from `subscribe_state`.
    fn subscribe_state_as<T, F>(&self, key: &str, callback: F) -> Result<Subscription, BusError>
    where
        T: DeserializeOwned,
        F: Fn(T) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.subscribe_state(
            key,
            Handler::new(move |value: &Value| {
                let typed = T::deserialize(value)?;
                callback(typed)
            }),
        )
    }
}

impl<B: MessageBus + ?Sized> MessageBusExt for B {}
