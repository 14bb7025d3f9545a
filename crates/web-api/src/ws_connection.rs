//! WebSocket 连接生命周期
//!
//! 每个连接拆成两个任务：发送任务消费本连接的无界出站通道，
//! 接收任务把文本帧交给广播路由器。任一任务结束即认为连接
//! 断开，由路由器完成注销和补发 leave 的收尾。

use std::sync::Arc;

use application::ChatHub;
use axum::extract::ws::{Message as WsMessage, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

pub async fn serve(socket: WebSocket, hub: Arc<ChatHub>) {
    let (mut sender, mut incoming) = socket.split();

    // 出站通道：注册表只往这里写，慢连接不会反压路由器
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let connection_id = hub.connect(tx).await;

    // 发送任务：把广播载荷写到 WebSocket
    let mut send_task = tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if sender.send(WsMessage::Text(payload.into())).await.is_err() {
                tracing::debug!("发送失败，结束发送任务");
                break;
            }
        }
    });

    // 接收任务：入站文本帧交给路由器处理
    let recv_hub = hub.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = incoming.next().await {
            match message {
                WsMessage::Text(text) => {
                    recv_hub.handle_frame(connection_id, text.as_str()).await;
                }
                WsMessage::Close(_) => {
                    tracing::debug!(connection_id = %connection_id, "客户端关闭连接");
                    break;
                }
                // Ping/Pong 由 axum 自动应答，二进制帧不在协议内
                _ => {}
            }
        }
    });

    // 任一任务结束即视为连接断开，另一侧随之终止
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    // 注销连接；未显式 leave 的绑定用户在这里触发下线
    hub.disconnect(connection_id).await;
    tracing::debug!(connection_id = %connection_id, "WebSocket 连接已清理");
}
