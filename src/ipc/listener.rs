//! Inbound side of the IPC transport.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use async_trait::async_trait;

use super::{
    OPT_INPUT_BUFFER_SIZE, OPT_OUTPUT_BUFFER_SIZE, OPT_SECURITY_DESCRIPTOR, PRE_LISTEN_OPTS,
    SCHEME,
};
use crate::addr::full_addr;
use crate::error::{Result, TransportError};
use crate::options::{OptionStore, OptionValue};
use crate::stream::{Acceptor, BindConfig, Provider};
use crate::tran::{self, Pipe, ProtocolInfo};

/// Listener lifecycle. The acceptor handle is set at most once; `Closed`
/// is terminal and re-listening is not supported.
enum State {
    Created,
    Listening(Arc<dyn Acceptor>),
    Closed,
}

/// Accepts connections on one named endpoint on behalf of a message
/// socket.
///
/// Expected usage is a dedicated accept loop: call
/// [`accept`](tran::Listener::accept) repeatedly and hand each returned
/// pipe off for servicing. Closing the listener from any task wakes a
/// blocked accept.
pub struct Listener {
    path: String,
    proto: ProtocolInfo,
    provider: Arc<dyn Provider>,
    opts: RwLock<OptionStore>,
    state: Mutex<State>,
}

impl Listener {
    pub(super) fn new(
        path: String,
        proto: ProtocolInfo,
        provider: Arc<dyn Provider>,
        opts: OptionStore,
    ) -> Self {
        Self {
            path,
            proto,
            provider,
            opts: RwLock::new(opts),
            state: Mutex::new(State::Created),
        }
    }

    fn bind_config(&self) -> Result<BindConfig> {
        let opts = self.opts.read().unwrap_or_else(PoisonError::into_inner);
        Ok(BindConfig {
            input_buffer_size: opts.get_i32(OPT_INPUT_BUFFER_SIZE)?,
            output_buffer_size: opts.get_i32(OPT_OUTPUT_BUFFER_SIZE)?,
            security_descriptor: opts.get_str(OPT_SECURITY_DESCRIPTOR)?,
        })
    }

    fn is_closed(&self) -> bool {
        matches!(
            *self.state.lock().unwrap_or_else(PoisonError::into_inner),
            State::Closed
        )
    }
}

#[async_trait]
impl tran::Listener for Listener {
    async fn listen(&self) -> Result<()> {
        {
            let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            match *state {
                State::Created => {}
                State::Listening(_) => return Err(TransportError::AlreadyListening),
                State::Closed => return Err(TransportError::Closed),
            }
        }

        let config = self.bind_config()?;
        let acceptor: Arc<dyn Acceptor> =
            Arc::from(self.provider.listen(&self.path, &config).await?);

        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match *state {
            State::Created => {
                tracing::debug!(path = %self.path, "listening on pipe endpoint");
                *state = State::Listening(acceptor);
                Ok(())
            }
            // A concurrent listen() won the race for the endpoint.
            State::Listening(_) => {
                acceptor.close();
                Err(TransportError::AlreadyListening)
            }
            // close() arrived while we were binding.
            State::Closed => {
                acceptor.close();
                Err(TransportError::Closed)
            }
        }
    }

    async fn accept(&self) -> Result<Pipe> {
        let acceptor = {
            let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            match *state {
                State::Listening(ref a) => a.clone(),
                State::Created => return Err(TransportError::NotListening),
                State::Closed => return Err(TransportError::Closed),
            }
        };

        match acceptor.accept().await {
            Ok(conn) => {
                tracing::debug!(path = %self.path, "accepted pipe connection");
                // The store is read at accept time so inheritable settings
                // reflect the listener's current configuration.
                let opts = self.opts.read().unwrap_or_else(PoisonError::into_inner);
                Ok(Pipe::wrap(conn, self.proto.clone(), &opts))
            }
            Err(_) if self.is_closed() => Err(TransportError::Closed),
            Err(e) => Err(e.into()),
        }
    }

    fn close(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let State::Listening(ref acceptor) = *state {
            acceptor.close();
            tracing::debug!(path = %self.path, "closed pipe listener");
        }
        *state = State::Closed;
        Ok(())
    }

    fn address(&self) -> String {
        full_addr(SCHEME, &self.path)
    }

    fn set_option(&self, name: &str, value: OptionValue) -> Result<()> {
        if PRE_LISTEN_OPTS.contains(&name) {
            let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            match *state {
                State::Created => {}
                State::Listening(_) => return Err(TransportError::AlreadyListening),
                State::Closed => return Err(TransportError::Closed),
            }
        }
        self.opts
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .set(name, value)
    }

    fn get_option(&self, name: &str) -> Result<OptionValue> {
        self.opts
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = tran::Listener::close(self);
    }
}
