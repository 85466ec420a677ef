//! Full matches over loopback TCP.

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;

use quarto_rust::client::connect_and_play;
use quarto_rust::constants::MAX_INVALID_MOVES;
use quarto_rust::game::Game;
use quarto_rust::player::AiPlayer;
use quarto_rust::protocol::{ClientMessage, ServerMessage};
use quarto_rust::search::SearchConfig;
use quarto_rust::server::{serve_match, serve_matches};
use quarto_rust::session::MatchResult;
use quarto_rust::state::GameState;

const CONFIG: SearchConfig = SearchConfig {
    depth: 2,
    always_search: false,
};

fn spawn_server(game: Game) -> (String, thread::JoinHandle<anyhow::Result<MatchResult>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let handle = thread::spawn(move || serve_match(&listener, game, MAX_INVALID_MOVES));
    (addr, handle)
}

#[test]
fn test_two_clients_finish_a_match() {
    let (addr, server) = spawn_server(Game::with_rng(&mut fastrand::Rng::with_seed(9)));

    let clients: Vec<_> = [("ada", 21), ("bob", 22)]
        .into_iter()
        .map(|(name, seed)| {
            let addr = addr.clone();
            thread::spawn(move || {
                let mut ai = AiPlayer::with_seed(name, CONFIG, seed);
                connect_and_play(&addr, name, &mut ai)
            })
        })
        .collect();

    let result = server.join().unwrap().unwrap();
    for client in clients {
        assert_eq!(client.join().unwrap().unwrap(), result);
    }
    assert!(!matches!(result, MatchResult::Forfeit(_)));
}

fn send(stream: &mut TcpStream, message: &ClientMessage) {
    let mut line = serde_json::to_string(message).unwrap();
    line.push('\n');
    stream.write_all(line.as_bytes()).unwrap();
}

fn recv(reader: &mut BufReader<TcpStream>) -> ServerMessage {
    let mut line = String::new();
    reader.read_line(&mut line).unwrap();
    serde_json::from_str(&line).unwrap()
}

#[test]
fn test_repeated_garbage_forfeits() {
    // Player 0 starts, so the first client to connect moves first
    let (addr, server) = spawn_server(Game::from_state(GameState::new(0)));

    let mut first = TcpStream::connect(&addr).unwrap();
    let mut first_reader = BufReader::new(first.try_clone().unwrap());
    send(
        &mut first,
        &ClientMessage::Hello {
            name: "mallory".into(),
        },
    );
    assert_eq!(recv(&mut first_reader), ServerMessage::Welcome { player: 0 });

    let second = thread::spawn({
        let addr = addr.clone();
        move || {
            let mut ai = AiPlayer::with_seed("bob", CONFIG, 5);
            connect_and_play(&addr, "bob", &mut ai)
        }
    });

    for _ in 0..MAX_INVALID_MOVES {
        assert!(matches!(
            recv(&mut first_reader),
            ServerMessage::YourTurn { .. }
        ));
        first.write_all(b"not json\n").unwrap();
        assert!(matches!(
            recv(&mut first_reader),
            ServerMessage::Rejected { .. }
        ));
    }
    let expected = MatchResult::Forfeit(0);
    assert_eq!(
        recv(&mut first_reader),
        ServerMessage::GameOver { result: expected }
    );

    assert_eq!(server.join().unwrap().unwrap(), expected);
    assert_eq!(second.join().unwrap().unwrap(), expected);
}

/// Connect, say hello and wait for the welcome, then hand back the socket.
fn join(addr: &str, name: &str) -> TcpStream {
    let mut stream = TcpStream::connect(addr).unwrap();
    let mut reader = BufReader::new(stream.try_clone().unwrap());
    send(&mut stream, &ClientMessage::Hello { name: name.into() });
    assert!(matches!(recv(&mut reader), ServerMessage::Welcome { .. }));
    stream
}

#[test]
fn test_server_survives_abandoned_match() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let mut rng = fastrand::Rng::with_seed(3);
    let server = thread::spawn(move || {
        serve_matches(&listener, 2, MAX_INVALID_MOVES, || Game::with_rng(&mut rng))
    });

    // First match: both players leave right after joining
    let quitters = [join(&addr, "gone"), join(&addr, "also gone")];
    drop(quitters);

    let clients: Vec<_> = [("ada", 31), ("bob", 32)]
        .into_iter()
        .map(|(name, seed)| {
            let addr = addr.clone();
            thread::spawn(move || {
                let mut ai = AiPlayer::with_seed(name, CONFIG, seed);
                connect_and_play(&addr, name, &mut ai)
            })
        })
        .collect();

    let results = server.join().unwrap();
    assert_eq!(results.len(), 1);
    for client in clients {
        assert_eq!(client.join().unwrap().unwrap(), results[0]);
    }
}
