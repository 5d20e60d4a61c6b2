pub mod cart;
pub mod banks;
pub mod nametbl;

pub mod decode;
pub mod irq;
pub mod board;
pub mod mapper;

pub mod savestate;
pub mod error;

pub use board::{lookup, Board, BoardDescriptor, BOARDS};
pub use cart::CartImage;
pub use error::MapperError;
pub use irq::IrqLine;
pub use mapper::{Mapper, PpuTarget};
pub use nametbl::Mirroring;
