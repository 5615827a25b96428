#![allow(dead_code)]

use std::{
    io,
    pin::Pin,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    task::{Context, Poll},
};

use hyper::Uri;
use tokio::io::{duplex, AsyncRead, AsyncWrite, DuplexStream, ReadBuf};
use tonic::transport::{Channel, Endpoint, Server};
use tower::service_fn;

use greeter::grpc::rpc::greeter_server::{Greeter, GreeterServer};

const PREFACE_LEN: usize = 24;
const FRAME_HEADER_LEN: usize = 9;
const PING: u8 = 0x6;
const ACK: u8 = 0x1;

/// Serve `service` over an in-memory pipe and return a lazy channel to it,
/// plus the number of PING frames the client has written so far.
pub fn serve_in_memory<G: Greeter>(
    service: GreeterServer<G>,
    endpoint: Endpoint,
) -> (Channel, Arc<AtomicUsize>) {
    let (client_io, server_io) = duplex(64 * 1024);
    tokio::spawn(async move {
        Server::builder()
            .add_service(service)
            .serve_with_incoming(tokio_stream::once(Ok::<_, io::Error>(server_io)))
            .await
    });

    let pings = Arc::new(AtomicUsize::new(0));
    let mut io = Some(FrameTap::new(client_io, pings.clone()));
    let channel = endpoint.connect_with_connector_lazy(service_fn(move |_: Uri| {
        let io = io.take();
        async move {
            io.ok_or_else(|| io::Error::new(io::ErrorKind::Other, "transport already used"))
        }
    }));
    (channel, pings)
}

pub fn pings(counter: &AtomicUsize) -> usize {
    counter.load(Ordering::SeqCst)
}

/// Client side of the pipe. Parses the outgoing HTTP/2 byte stream and counts
/// PING frames that are not acks.
pub struct FrameTap {
    io: DuplexStream,
    buf: Vec<u8>,
    preface_seen: bool,
    pings: Arc<AtomicUsize>,
}

impl FrameTap {
    fn new(io: DuplexStream, pings: Arc<AtomicUsize>) -> Self {
        Self {
            io,
            buf: Vec::new(),
            preface_seen: false,
            pings,
        }
    }

    fn feed(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
        if !self.preface_seen {
            if self.buf.len() < PREFACE_LEN {
                return;
            }
            self.buf.drain(..PREFACE_LEN);
            self.preface_seen = true;
        }

        while self.buf.len() >= FRAME_HEADER_LEN {
            let len = u32::from_be_bytes([0, self.buf[0], self.buf[1], self.buf[2]]) as usize;
            if self.buf.len() < FRAME_HEADER_LEN + len {
                break;
            }
            let (kind, flags) = (self.buf[3], self.buf[4]);
            if kind == PING && flags & ACK == 0 {
                self.pings.fetch_add(1, Ordering::SeqCst);
            }
            self.buf.drain(..FRAME_HEADER_LEN + len);
        }
    }
}

impl AsyncRead for FrameTap {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.io).poll_read(cx, buf)
    }
}

impl AsyncWrite for FrameTap {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let poll = Pin::new(&mut self.io).poll_write(cx, buf);
        if let Poll::Ready(Ok(n)) = &poll {
            self.feed(&buf[..*n]);
        }
        poll
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.io).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.io).poll_shutdown(cx)
    }
}
