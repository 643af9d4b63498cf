//! Line-oriented terminal front end for the chat widget.

use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::Result;
use crate::interfaces::surface::WidgetSurface;
use crate::panel_fsm::{HeaderIcon, MaximizeIcon, PanelAction, PanelView};
use crate::transcript::{Message, MessageBody, MessageRole};
use crate::widget::{ChatWidget, ENTER_KEY};

const BOLD_ON: &str = "\x1b[1m";
const BOLD_OFF: &str = "\x1b[22m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

/// Renders the widget to a writer. Messages that arrive while the panel is
/// collapsed are held back and shown when it opens again.
pub struct TerminalSurface<W: Write> {
    out: W,
    color: bool,
    body_visible: bool,
    hidden: Vec<Message>,
}

impl<W: Write> TerminalSurface<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self {
            out,
            color,
            body_visible: false,
            hidden: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn pending_hidden(&self) -> usize {
        self.hidden.len()
    }

    fn print(&mut self, message: &Message) {
        let who = match message.role {
            MessageRole::User => "you",
            MessageRole::Bot => "ayurbot",
        };
        let body = match message.body {
            MessageBody::Markup => markup_to_terminal(&message.text, self.color),
            MessageBody::Plain => message.text.clone(),
            MessageBody::Error if self.color => format!("{RED}{}{RESET}", message.text),
            MessageBody::Error => message.text.clone(),
        };
        let result = writeln!(
            self.out,
            "[{}] {who}: {}",
            message.local_time(),
            body.trim_end()
        );
        if let Err(err) = result {
            warn!(error = %err, "failed to write message");
        }
    }
}

impl<W: Write> WidgetSurface for TerminalSurface<W> {
    fn apply_panel(&mut self, view: &PanelView) {
        self.body_visible = view.body_visible;
        let chevron = match view.header_icon {
            HeaderIcon::ChevronUp => "^",
            HeaderIcon::ChevronDown => "v",
        };
        let size = match view.maximize_icon {
            MaximizeIcon::Expand => "[+]",
            MaximizeIcon::Compress => "[-]",
        };
        if let Err(err) = writeln!(self.out, "-- AyurBot {chevron} {size} --") {
            warn!(error = %err, "failed to write panel header");
        }
        if self.body_visible {
            for message in std::mem::take(&mut self.hidden) {
                self.print(&message);
            }
        }
    }

    fn append_message(&mut self, message: &Message) {
        if self.body_visible {
            self.print(message);
        } else {
            self.hidden.push(message.clone());
        }
    }

    fn clear_input(&mut self) {}

    fn scroll_to_bottom(&mut self) {
        if let Err(err) = self.out.flush() {
            warn!(error = %err, "failed to flush output");
        }
    }
}

/// Converts formatter markup into terminal text.
pub fn markup_to_terminal(markup: &str, color: bool) -> String {
    let (bold_on, bold_off) = if color { (BOLD_ON, BOLD_OFF) } else { ("", "") };
    let text = markup
        .replace("<b>", bold_on)
        .replace("</b>", bold_off)
        .replace("<br>", "\n")
        .replace("<ul>", "")
        .replace("</ul>", "")
        .replace("<li>", "\n  * ")
        .replace("</li>", "");
    let text = text.trim_start_matches('\n');
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

enum Command {
    TogglePanel,
    ToggleMaximize,
    Quit,
    Say(String),
}

fn parse_command(line: &str) -> Command {
    match line.trim() {
        "/open" | "/close" => Command::TogglePanel,
        "/max" => Command::ToggleMaximize,
        "/quit" | "/exit" => Command::Quit,
        _ => Command::Say(line.to_string()),
    }
}

/// Drives the widget from `input` until `/quit` or end of input.
///
/// Each message is resolved on its own task, so several requests can be in
/// flight at once. Replies are shown in the order they complete. At end of
/// input the loop waits for outstanding replies before returning.
pub async fn run<R, W>(widget: &mut ChatWidget<TerminalSurface<W>>, input: R) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<(u64, Message)>();
    let mut lines = input.lines();
    let mut in_flight = 0usize;
    let mut input_open = true;

    loop {
        if !input_open && in_flight == 0 {
            break;
        }
        tokio::select! {
            line = lines.next_line(), if input_open => {
                let Some(line) = line? else {
                    debug!(in_flight, "input closed");
                    input_open = false;
                    continue;
                };
                match parse_command(&line) {
                    Command::TogglePanel => {
                        widget.dispatch(PanelAction::ToggleOpen);
                    }
                    Command::ToggleMaximize => {
                        widget.dispatch(PanelAction::ToggleMaximize);
                    }
                    Command::Quit => break,
                    Command::Say(text) => {
                        widget.set_input(text);
                        if let Some(pending) = widget.on_key(ENTER_KEY) {
                            in_flight += 1;
                            let tx = tx.clone();
                            tokio::spawn(async move {
                                let seq = pending.seq();
                                let message = pending.resolve().await;
                                let _ = tx.send((seq, message));
                            });
                        }
                    }
                }
            }
            Some((seq, message)) = rx.recv(), if in_flight > 0 => {
                in_flight -= 1;
                debug!(seq, in_flight, "reply delivered");
                widget.receive(message);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WidgetConfig;
    use crate::context_store::MemoryContextStore;
    use crate::error::ChatWidgetError;
    use crate::interfaces::backend::{ChatBackend, ChatReply, ChatRequest};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct EchoBackend;

    #[async_trait]
    impl ChatBackend for EchoBackend {
        async fn send(&self, request: &ChatRequest) -> crate::error::Result<ChatReply> {
            if request.message == "fail" {
                return Err(ChatWidgetError::Http("boom".to_string()));
            }
            Ok(ChatReply {
                response: Some(format!("**echo** {}", request.message)),
            })
        }
    }

    fn widget() -> ChatWidget<TerminalSurface<Vec<u8>>> {
        ChatWidget::new(
            &WidgetConfig::default(),
            TerminalSurface::new(Vec::new(), false),
            Arc::new(EchoBackend),
            Arc::new(MemoryContextStore::new()),
        )
    }

    fn output(widget: ChatWidget<TerminalSurface<Vec<u8>>>) -> String {
        String::from_utf8(widget.into_surface().into_inner()).expect("utf8")
    }

    #[test]
    fn markup_converts_to_plain_lines() {
        assert_eq!(
            markup_to_terminal("<b>Diet</b><br><ul><li>rice</li><li>ghee</li></ul>", false),
            "Diet\n\n  * rice\n  * ghee"
        );
        assert_eq!(
            markup_to_terminal("<b>x</b>", true),
            "\x1b[1mx\x1b[22m"
        );
        assert_eq!(markup_to_terminal("a &lt;b&gt; &amp;amp;", false), "a <b> &amp;");
    }

    #[tokio::test]
    async fn session_prints_replies_and_panel_changes() {
        let mut widget = widget();
        let script = "/open\nhello\n\n/max\nfail\n";
        run(&mut widget, script.as_bytes()).await.expect("run");

        assert_eq!(widget.transcript().len(), 4);
        let out = output(widget);
        assert!(out.contains("-- AyurBot v [+] --"));
        assert!(out.contains("-- AyurBot v [-] --"));
        assert!(out.contains("you: hello"));
        assert!(out.contains("ayurbot: echo hello"));
        assert!(out.contains("ayurbot: Sorry, I'm having trouble connecting right now."));
    }

    #[tokio::test]
    async fn messages_wait_while_collapsed() {
        let mut widget = widget();
        run(&mut widget, "hello\n".as_bytes()).await.expect("run");
        assert_eq!(widget.transcript().len(), 2);
        assert_eq!(widget.surface().pending_hidden(), 2);

        run(&mut widget, "/open\n".as_bytes()).await.expect("run");
        assert_eq!(widget.surface().pending_hidden(), 0);
        let out = output(widget);
        assert!(out.contains("you: hello"));
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn write_failures_do_not_abort_rendering() {
        let mut widget = ChatWidget::new(
            &WidgetConfig::default(),
            TerminalSurface::new(BrokenPipe, false),
            Arc::new(EchoBackend),
            Arc::new(MemoryContextStore::new()),
        );
        widget.dispatch(PanelAction::ToggleOpen);
        widget.receive(Message::bot_markup("ok<br>"));
        assert!(widget.panel().is_open());
        assert_eq!(widget.transcript().len(), 1);
        assert_eq!(widget.surface().pending_hidden(), 0);
    }

    #[tokio::test]
    async fn quit_stops_reading() {
        let mut widget = widget();
        run(&mut widget, "/quit\nhello\n".as_bytes())
            .await
            .expect("run");
        assert!(widget.transcript().is_empty());
    }
}
