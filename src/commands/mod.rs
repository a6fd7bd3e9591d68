/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes two top-level command modules:

- `chat`    -- Interactive chat session
- `history` -- List, show, and delete saved conversations

These handlers are intentionally small and use the library components:
the session state machine, the response gateways, and the history store.
*/

pub mod chat;
pub mod history;
