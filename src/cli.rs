use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "trackscan")]
#[command(about = "Railway track crack analysis client", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 推論サービスのURL（環境変数・設定ファイルより優先）
    #[arg(long, global = true)]
    pub server: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 画像を1枚解析
    Analyze {
        /// 画像ファイルのパス
        #[arg(required = true)]
        image: PathBuf,

        /// 結果をJSONで出力
        #[arg(long)]
        json: bool,
    },

    /// フォルダ内の画像をまとめて解析
    Batch {
        /// 画像フォルダのパス
        #[arg(required = true)]
        folder: PathBuf,

        /// サブフォルダも再帰的にスキャン
        #[arg(short = 'r', long)]
        recursive: bool,

        /// 結果をJSONで出力
        #[arg(long)]
        json: bool,
    },

    /// 対話的に1枚ずつ解析
    Session,

    /// サービスの状態を確認
    Health,

    /// 設定を表示/編集
    Config {
        /// サービスURLを設定
        #[arg(long)]
        set_server_url: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
