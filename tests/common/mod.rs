//! A scripted stand-in for a MySQL server, just enough protocol for a
//! client to connect, run its session setup and ping.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

pub const COM_QUIT: u8 = 0x01;
pub const COM_QUERY: u8 = 0x03;
pub const COM_PING: u8 = 0x0e;

const CLIENT_LONG_PASSWORD: u32 = 0x0000_0001;
const CLIENT_PROTOCOL_41: u32 = 0x0000_0200;
const CLIENT_TRANSACTIONS: u32 = 0x0000_2000;
const CLIENT_SECURE_CONNECTION: u32 = 0x0000_8000;
const CLIENT_PLUGIN_AUTH: u32 = 0x0008_0000;

const SERVER_STATUS_AUTOCOMMIT: u16 = 0x0002;

/// How the server answers `COM_PING`.
#[derive(Clone, Copy, Debug)]
pub enum PingReply {
    Ok,
    Err,
}

/// Accepts one connection and holds it open without ever writing.
pub async fn stalling_server() -> (u16, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = tokio::spawn(async move {
        let (_socket, _) = listener.accept().await.unwrap();
        std::future::pending::<()>().await;
    });
    (port, handle)
}

/// Serves one connection: completes the handshake, acknowledges every
/// query, answers pings with `ping` and records the command bytes it saw
/// until the client quits or hangs up.
pub async fn scripted_server(ping: PingReply) -> (u16, JoinHandle<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        serve(&mut socket, ping).await
    });
    (port, handle)
}

async fn serve(socket: &mut TcpStream, ping: PingReply) -> Vec<u8> {
    let mut commands = vec![];

    if write_packet(socket, 0, &handshake()).await.is_err() {
        return commands;
    }
    // handshake response; credentials are not checked
    if read_packet(socket).await.is_none() {
        return commands;
    }
    if write_packet(socket, 2, &ok_packet()).await.is_err() {
        return commands;
    }

    while let Some(packet) = read_packet(socket).await {
        let Some(&command) = packet.first() else {
            break;
        };
        commands.push(command);
        let reply = match (command, ping) {
            (COM_QUERY, _) | (COM_PING, PingReply::Ok) => ok_packet(),
            (COM_PING, PingReply::Err) => err_packet(1053, "Server shutdown in progress"),
            _ => break,
        };
        if write_packet(socket, 1, &reply).await.is_err() {
            break;
        }
    }

    commands
}

fn handshake() -> Vec<u8> {
    let capabilities = CLIENT_LONG_PASSWORD
        | CLIENT_PROTOCOL_41
        | CLIENT_TRANSACTIONS
        | CLIENT_SECURE_CONNECTION
        | CLIENT_PLUGIN_AUTH;

    let mut p = vec![10];
    p.extend_from_slice(b"8.0.36\0");
    p.extend_from_slice(&7u32.to_le_bytes());
    p.extend_from_slice(b"abcdefgh");
    p.push(0);
    p.extend_from_slice(&(capabilities as u16).to_le_bytes());
    p.push(45); // utf8mb4_general_ci
    p.extend_from_slice(&SERVER_STATUS_AUTOCOMMIT.to_le_bytes());
    p.extend_from_slice(&((capabilities >> 16) as u16).to_le_bytes());
    p.push(21);
    p.extend_from_slice(&[0; 10]);
    p.extend_from_slice(b"ijklmnopqrst\0");
    p.extend_from_slice(b"mysql_native_password\0");
    p
}

fn ok_packet() -> Vec<u8> {
    let mut p = vec![0x00, 0, 0];
    p.extend_from_slice(&SERVER_STATUS_AUTOCOMMIT.to_le_bytes());
    p.extend_from_slice(&0u16.to_le_bytes());
    p
}

fn err_packet(code: u16, message: &str) -> Vec<u8> {
    let mut p = vec![0xff];
    p.extend_from_slice(&code.to_le_bytes());
    p.extend_from_slice(b"#08S01");
    p.extend_from_slice(message.as_bytes());
    p
}

async fn write_packet(socket: &mut TcpStream, seq: u8, payload: &[u8]) -> std::io::Result<()> {
    let len = (payload.len() as u32).to_le_bytes();
    socket.write_all(&[len[0], len[1], len[2], seq]).await?;
    socket.write_all(payload).await?;
    socket.flush().await
}

async fn read_packet(socket: &mut TcpStream) -> Option<Vec<u8>> {
    let mut header = [0; 4];
    socket.read_exact(&mut header).await.ok()?;
    let len = u32::from_le_bytes([header[0], header[1], header[2], 0]) as usize;
    let mut payload = vec![0; len];
    socket.read_exact(&mut payload).await.ok()?;
    Some(payload)
}
