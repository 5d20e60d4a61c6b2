pub const NAMETBL_START: u16 = 0x2000;
const NAMETBL_SIZE: usize = 1024;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mirroring {
  #[default] Horizontal,
  Vertical,
  SingleScreenA,
  SingleScreenB,
  FourScreen,
  /// Physical bank for each of the four logical nametables, indexed by `(addr >> 10) & 3`.
  PerAddress([u8; 4]),
}

impl Mirroring {
  pub const STATE_LEN: usize = 5;

  fn pages(&self) -> [u8; 4] {
    match self {
      Mirroring::Horizontal    => [0, 0, 1, 1],
      Mirroring::Vertical      => [0, 1, 0, 1],
      Mirroring::SingleScreenA => [0; 4],
      Mirroring::SingleScreenB => [1; 4],
      Mirroring::FourScreen    => [0, 1, 2, 3],
      Mirroring::PerAddress(table) => *table,
    }
  }

  pub fn to_bytes(&self) -> [u8; Self::STATE_LEN] {
    let mode = match self {
      Mirroring::Horizontal    => 0,
      Mirroring::Vertical      => 1,
      Mirroring::SingleScreenA => 2,
      Mirroring::SingleScreenB => 3,
      Mirroring::FourScreen    => 4,
      Mirroring::PerAddress(_) => 5,
    };
    let table = match self {
      Mirroring::PerAddress(table) => *table,
      _ => [0; 4],
    };

    [mode, table[0], table[1], table[2], table[3]]
  }

  pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
    let [mode, a, b, c, d] = bytes.try_into().ok()?;
    let mirroring = match mode {
      0 => Mirroring::Horizontal,
      1 => Mirroring::Vertical,
      2 => Mirroring::SingleScreenA,
      3 => Mirroring::SingleScreenB,
      4 => Mirroring::FourScreen,
      5 => Mirroring::PerAddress([a, b, c, d]),
      _ => return None,
    };
    Some(mirroring)
  }
}

/// Maps the four logical nametables onto the console's 2kb of VRAM,
/// or onto the 4kb of four-screen boards.
#[derive(Debug, Clone)]
pub struct NametableMap {
  mode: Mirroring,
  pages: [usize; 4],
  vram_banks: usize,
  locked: bool,
}

impl NametableMap {
  pub fn new(mode: Mirroring, four_screen: bool) -> Self {
    let mut map = Self {
      mode,
      pages: [0; 4],
      vram_banks: if four_screen { 4 } else { 2 },
      locked: false,
    };

    map.apply(if four_screen { Mirroring::FourScreen } else { mode });
    // four-screen boards wire the extra vram directly; mapper mirroring bits are ignored
    map.locked = four_screen;
    map
  }

  pub fn mode(&self) -> Mirroring { self.mode }
  pub fn vram_size(&self) -> usize { self.vram_banks * NAMETBL_SIZE }

  pub fn update(&mut self, mode: Mirroring) {
    if self.locked { return; }
    self.apply(mode);
  }

  fn apply(&mut self, mode: Mirroring) {
    self.mode = mode;
    for (page, bank) in mode.pages().into_iter().enumerate() {
      self.pages[page] = bank as usize % self.vram_banks;
    }
  }

  pub fn bank(&self, addr: u16) -> usize {
    self.pages[(addr as usize >> 10) & 3]
  }

  /// Offset inside the nametable vram.
  pub fn translate(&self, addr: u16) -> usize {
    self.bank(addr) * NAMETBL_SIZE + (addr as usize & (NAMETBL_SIZE - 1))
  }
}
